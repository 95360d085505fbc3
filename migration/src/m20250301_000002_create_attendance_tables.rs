use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_roster_tables::{Students, Teachers};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 考勤簿表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceBooks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceBooks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceBooks::Name).string().not_null())
                    .col(ColumnDef::new(AttendanceBooks::BookCode).string().not_null())
                    .col(
                        ColumnDef::new(AttendanceBooks::SessionWeight)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AttendanceBooks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceBooks::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤簿学生（选课）表 ====================
        manager
            .create_table(
                Table::create()
                    .table(BookStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookStudents::BookId).big_integer().not_null())
                    .col(ColumnDef::new(BookStudents::StudentId).string().not_null())
                    .col(
                        ColumnDef::new(BookStudents::EnrolledAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookStudents::Table, BookStudents::BookId)
                            .to(AttendanceBooks::Table, AttendanceBooks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookStudents::Table, BookStudents::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤簿教师表 ====================
        manager
            .create_table(
                Table::create()
                    .table(BookTeachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookTeachers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookTeachers::BookId).big_integer().not_null())
                    .col(ColumnDef::new(BookTeachers::TeacherId).string().not_null())
                    .col(
                        ColumnDef::new(BookTeachers::AssignedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookTeachers::Table, BookTeachers::BookId)
                            .to(AttendanceBooks::Table, AttendanceBooks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookTeachers::Table, BookTeachers::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::BookId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::AttendanceDate)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::SessionLabel)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::Present)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::WeightedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::BookId)
                            .to(AttendanceBooks::Table, AttendanceBooks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_book_students_book_student")
                    .table(BookStudents::Table)
                    .col(BookStudents::BookId)
                    .col(BookStudents::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_book_teachers_book_teacher")
                    .table(BookTeachers::Table)
                    .col(BookTeachers::BookId)
                    .col(BookTeachers::TeacherId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 考勤记录自然键：每个考勤簿每个学生每天每节课最多一条
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_attendance_records_natural_key")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::BookId)
                    .col(AttendanceRecords::StudentId)
                    .col(AttendanceRecords::AttendanceDate)
                    .col(AttendanceRecords::SessionLabel)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_records_date_present")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::AttendanceDate)
                    .col(AttendanceRecords::Present)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookTeachers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceBooks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AttendanceBooks {
    #[sea_orm(iden = "attendance_books")]
    Table,
    Id,
    Name,
    BookCode,
    SessionWeight,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookStudents {
    #[sea_orm(iden = "book_students")]
    Table,
    Id,
    BookId,
    StudentId,
    EnrolledAt,
}

#[derive(DeriveIden)]
enum BookTeachers {
    #[sea_orm(iden = "book_teachers")]
    Table,
    Id,
    BookId,
    TeacherId,
    AssignedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    #[sea_orm(iden = "attendance_records")]
    Table,
    Id,
    BookId,
    StudentId,
    AttendanceDate,
    SessionLabel,
    Present,
    WeightedCount,
    CreatedAt,
    UpdatedAt,
}
