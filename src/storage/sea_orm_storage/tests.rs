use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use super::SeaOrmStorage;
use super::ledger::retry_once_on_conflict;
use crate::config::DatabaseConfig;
use crate::entity::attendance_records::{ActiveModel as RecordActiveModel, Entity as Records};
use crate::entity::students::{ActiveModel as StudentActiveModel, Entity as Students};
use crate::errors::AttendanceError;
use crate::models::attendance::entities::AttendanceMark;
use crate::models::books::requests::{BookListQuery, CreateBookRequest};
use crate::models::roster::requests::{CreateStudentRequest, CreateTeacherRequest};

async fn memory_storage() -> SeaOrmStorage {
    SeaOrmStorage::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    })
    .await
    .expect("in-memory storage")
}

/// 与默认部署一致的文件 SQLite（WAL、多连接）
async fn file_storage(dir: &tempfile::TempDir) -> SeaOrmStorage {
    SeaOrmStorage::connect(&DatabaseConfig {
        url: dir
            .path()
            .join("attendance.db")
            .to_string_lossy()
            .into_owned(),
        pool_size: 10,
        timeout: 5,
    })
    .await
    .expect("file storage")
}

async fn add_student(storage: &SeaOrmStorage, id: &str, phone: Option<&str>) {
    storage
        .create_student_impl(CreateStudentRequest {
            id: id.to_string(),
            full_name: format!("Student {id}"),
            parent_phone: phone.map(str::to_string),
            email: None,
        })
        .await
        .expect("create student");
}

/// 创建考勤簿并登记学生
async fn book_with_students(
    storage: &SeaOrmStorage,
    code: &str,
    weight: i32,
    students: &[&str],
) -> i64 {
    let book = storage
        .create_book_impl(CreateBookRequest {
            name: format!("Course {code}"),
            book_code: code.to_string(),
            session_weight: weight,
        })
        .await
        .expect("create book");

    for id in students {
        if storage.get_student_by_id_impl(id).await.unwrap().is_none() {
            add_student(storage, id, Some("9800000000")).await;
        }
    }
    let ids: Vec<String> = students.iter().map(|s| s.to_string()).collect();
    storage.set_book_students_impl(book.id, &ids).await.unwrap();

    book.id
}

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

#[tokio::test]
async fn test_single_session_statistics() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2", "s3"]).await;

    let outcome = storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1", "s2"]))
        .await
        .unwrap();
    assert_eq!(outcome.created, 3);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.present_count, 2);
    assert_eq!(outcome.absent_count, 1);

    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert_eq!(stats.total_sessions, 1);
    for present in ["s1", "s2"] {
        let s = stats.students[present];
        assert_eq!(s.total_weighted, 1);
        assert_eq!(s.attended_weighted, 1);
        assert_eq!(s.percentage, 100.0);
    }
    let absent = stats.students["s3"];
    assert_eq!(absent.attended_weighted, 0);
    assert_eq!(absent.percentage, 0.0);
}

#[tokio::test]
async fn test_second_session_halves_partial_attendance() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2", "s3"]).await;

    storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1", "s2"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(book, day(3), "P2", &ids(&["s1", "s3"]))
        .await
        .unwrap();

    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.students["s1"].total_weighted, 2);
    assert_eq!(stats.students["s1"].attended_weighted, 2);
    assert_eq!(stats.students["s1"].percentage, 100.0);
    assert_eq!(stats.students["s2"].percentage, 50.0);
    assert_eq!(stats.students["s3"].percentage, 50.0);
}

#[tokio::test]
async fn test_resubmission_is_idempotent() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2", "s3"]).await;
    let present = ids(&["s1", "s2"]);

    storage
        .mark_session_impl(book, day(3), "P1", &present)
        .await
        .unwrap();
    let first = storage.get_records_by_date_session_impl(book).await.unwrap();
    let first_rows = Records::find().all(&storage.db).await.unwrap();

    let outcome = storage
        .mark_session_impl(book, day(3), "P1", &present)
        .await
        .unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.updated, 3);

    let second = storage.get_records_by_date_session_impl(book).await.unwrap();
    assert_eq!(first, second);

    let mut second_rows = Records::find().all(&storage.db).await.unwrap();
    assert_eq!(second_rows.len(), 3);
    second_rows.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    for row in &second_rows {
        let before = first_rows
            .iter()
            .find(|r| r.student_id == row.student_id)
            .unwrap();
        assert_eq!(row.present, before.present);
        assert_eq!(row.weighted_count, before.weighted_count);
        assert_eq!(row.created_at, before.created_at);
    }

    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert_eq!(stats.students["s1"].total_weighted, 1);
    assert_eq!(stats.students["s1"].percentage, 100.0);
    assert_eq!(stats.students["s3"].percentage, 0.0);
}

#[tokio::test]
async fn test_session_weight_scales_statistics() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "LAB4", 4, &["s1", "s2"]).await;

    storage
        .mark_session_impl(book, day(4), "LAB", &ids(&["s1"]))
        .await
        .unwrap();

    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert_eq!(stats.session_weight, 4);
    assert_eq!(stats.students["s1"].total_weighted, 4);
    assert_eq!(stats.students["s1"].attended_weighted, 4);
    assert_eq!(stats.students["s1"].percentage, 100.0);
    assert_eq!(stats.students["s2"].attended_weighted, 0);
    assert_eq!(stats.students["s2"].percentage, 0.0);
}

#[tokio::test]
async fn test_weighted_count_excludes_overwritten_record() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "LAB2", 2, &["s1"]).await;

    storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(book, day(4), "P1", &ids(&["s1"]))
        .await
        .unwrap();
    // 重复提交第二节不应累加
    storage
        .mark_session_impl(book, day(4), "P1", &ids(&["s1"]))
        .await
        .unwrap();

    let rows = Records::find().all(&storage.db).await.unwrap();
    let latest = rows
        .iter()
        .find(|r| r.attendance_date == "2025-03-04")
        .unwrap();
    assert_eq!(latest.weighted_count, 4);

    // 改为缺勤后只计入其他节次
    storage
        .mark_session_impl(book, day(4), "P1", &HashSet::new())
        .await
        .unwrap();
    let rows = Records::find().all(&storage.db).await.unwrap();
    let latest = rows
        .iter()
        .find(|r| r.attendance_date == "2025-03-04")
        .unwrap();
    assert!(!latest.present);
    assert_eq!(latest.weighted_count, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_double_submit_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_storage(&dir).await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2", "s3"]).await;

    let mut handles = Vec::new();
    for d in 1..=28 {
        for _ in 0..2 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage
                    .mark_session_impl(book, day(d), "P1", &ids(&["s1"]))
                    .await
            }));
        }
    }

    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.created + outcome.updated, 3);
        assert_eq!(outcome.present_count, 1);
        created += outcome.created;
    }

    // 每对重复提交只有一次真正创建记录
    assert_eq!(created, 84);
    assert_eq!(Records::find().count(&storage.db).await.unwrap(), 84);
    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert_eq!(stats.total_sessions, 28);
}

#[tokio::test]
async fn test_conflict_is_retried_once() {
    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;

    let value = retry_once_on_conflict("roll call", move || async move {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(AttendanceError::conflict("database is locked"))
        } else {
            Ok(42)
        }
    })
    .await
    .unwrap();

    assert_eq!(value, 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_conflict_is_surfaced() {
    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;

    let err = retry_once_on_conflict("roll call", move || async move {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(AttendanceError::conflict("duplicate key"))
    })
    .await
    .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_non_conflict_error_is_not_retried() {
    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;

    let err = retry_once_on_conflict("roll call", move || async move {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(AttendanceError::validation("unknown student"))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, AttendanceError::Validation(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_large_roster_roll_call() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "HALL", 1, &[]).await;

    // 4200 名学生 × 8 列超过单条语句的绑定参数上限
    let roster: Vec<String> = (0..4200).map(|i| format!("s{i:05}")).collect();
    for chunk in roster.chunks(1000) {
        let students = chunk.iter().map(|id| StudentActiveModel {
            id: Set(id.clone()),
            full_name: Set(format!("Student {id}")),
            parent_phone: Set(None),
            email: Set(None),
            created_at: Set(0),
        });
        Students::insert_many(students)
            .exec_without_returning(&storage.db)
            .await
            .unwrap();
    }
    storage.set_book_students_impl(book, &roster).await.unwrap();

    let present: HashSet<String> = roster.iter().cloned().collect();
    let outcome = storage
        .mark_session_impl(book, day(3), "ASSEMBLY", &present)
        .await
        .unwrap();
    assert_eq!(outcome.created, 4200);
    assert_eq!(outcome.present_count, 4200);

    let outcome = storage
        .mark_session_impl(book, day(3), "ASSEMBLY", &present)
        .await
        .unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.updated, 4200);
    assert_eq!(Records::find().count(&storage.db).await.unwrap(), 4200);
}

#[tokio::test]
async fn test_duplicate_key_insert_is_rejected() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1"]).await;

    let record = || RecordActiveModel {
        book_id: Set(book),
        student_id: Set("s1".to_string()),
        attendance_date: Set("2025-03-03".to_string()),
        session_label: Set("P1".to_string()),
        present: Set(true),
        weighted_count: Set(1),
        created_at: Set(0),
        updated_at: Set(0),
        ..Default::default()
    };

    record().insert(&storage.db).await.unwrap();
    let err = record()
        .insert(&storage.db)
        .await
        .map_err(|e| AttendanceError::from_db_write(e, "insert"))
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_mark_session_validation() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1"]).await;
    add_student(&storage, "outsider", None).await;

    let err = storage
        .mark_session_impl(book, day(3), "   ", &ids(&["s1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Validation(_)));

    let err = storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1", "outsider"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Validation(_)));
    assert!(err.message().contains("outsider"));

    // 校验失败不留下任何记录
    assert_eq!(Records::find().count(&storage.db).await.unwrap(), 0);

    let err = storage
        .mark_session_impl(9999, day(3), "P1", &HashSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::NotFound(_)));
}

#[tokio::test]
async fn test_book_weight_must_be_positive() {
    let storage = memory_storage().await;

    let err = storage
        .create_book_impl(CreateBookRequest {
            name: "Broken".to_string(),
            book_code: "BRK".to_string(),
            session_weight: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_roster_ids_are_rejected() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1"]).await;

    let err = storage
        .set_book_students_impl(book, &["s1".to_string(), "ghost".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Validation(_)));

    let err = storage
        .set_book_teachers_impl(book, &["nobody".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::Validation(_)));

    // 失败的替换不影响原名册
    let roster = storage.get_book_roster_impl(book).await.unwrap();
    assert_eq!(roster.student_ids, vec!["s1".to_string()]);
    assert!(roster.teacher_ids.is_empty());
}

#[tokio::test]
async fn test_delete_book_cascades_records() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2"]).await;
    let other = book_with_students(&storage, "CS102", 1, &["s1"]).await;

    storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(other, day(3), "P1", &ids(&["s1"]))
        .await
        .unwrap();

    assert!(storage.delete_book_impl(book).await.unwrap());
    assert!(storage.get_book_by_id_impl(book).await.unwrap().is_none());
    assert_eq!(Records::find().count(&storage.db).await.unwrap(), 1);
    assert!(!storage.delete_book_impl(book).await.unwrap());

    // 学生本身不随考勤簿删除
    assert!(storage.get_student_by_id_impl("s2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_roster_removal_keeps_history() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2"]).await;

    storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1", "s2"]))
        .await
        .unwrap();
    let roster = storage
        .set_book_students_impl(book, &["s1".to_string()])
        .await
        .unwrap();
    assert_eq!(roster.student_ids, vec!["s1".to_string()]);

    let table = storage.get_records_by_date_session_impl(book).await.unwrap();
    let session = &table[&day(3)]["P1"];
    assert_eq!(session["s1"], AttendanceMark::Present);
    assert_eq!(session["s2"], AttendanceMark::Present);

    let stats = storage.get_book_statistics_impl(book).await.unwrap();
    assert!(stats.students.contains_key("s1"));
    assert!(!stats.students.contains_key("s2"));

    // 被移出的学生不再出现在新点名中
    let outcome = storage
        .mark_session_impl(book, day(4), "P1", &HashSet::new())
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.absent_count, 1);
}

#[tokio::test]
async fn test_records_table_is_ordered_by_date_and_session() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1", "s2"]).await;

    storage
        .mark_session_impl(book, day(5), "P2", &ids(&["s2"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(book, day(3), "P1", &ids(&["s1"]))
        .await
        .unwrap();

    let table = storage.get_records_by_date_session_impl(book).await.unwrap();
    let dates: Vec<NaiveDate> = table.keys().copied().collect();
    assert_eq!(dates, vec![day(3), day(5)]);
    assert_eq!(table[&day(3)]["P1"]["s2"], AttendanceMark::Absent);
    assert_eq!(table[&day(5)]["P2"]["s2"], AttendanceMark::Present);
}

#[tokio::test]
async fn test_absentees_empty_date() {
    let storage = memory_storage().await;
    book_with_students(&storage, "CS101", 1, &["s1"]).await;

    let absentees = storage.list_absentees_impl(day(20)).await.unwrap();
    assert!(absentees.is_empty());
}

#[tokio::test]
async fn test_absentees_grouped_across_books() {
    let storage = memory_storage().await;
    let math = book_with_students(&storage, "MA101", 1, &["s1", "s2"]).await;
    let physics = book_with_students(&storage, "PH101", 2, &["s1"]).await;

    storage
        .mark_session_impl(math, day(3), "P1", &ids(&["s2"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(math, day(3), "P2", &ids(&["s1", "s2"]))
        .await
        .unwrap();
    storage
        .mark_session_impl(physics, day(3), "LAB", &HashSet::new())
        .await
        .unwrap();
    // 其他日期的缺勤不计入
    storage
        .mark_session_impl(math, day(4), "P1", &HashSet::new())
        .await
        .unwrap();

    let absentees = storage.list_absentees_impl(day(3)).await.unwrap();
    assert_eq!(absentees.len(), 1);

    let digest = &absentees["s1"];
    assert_eq!(digest.full_name, "Student s1");
    assert_eq!(digest.parent_phone.as_deref(), Some("9800000000"));
    let sessions: Vec<(&str, &str)> = digest
        .sessions
        .iter()
        .map(|s| (s.book_code.as_str(), s.session_label.as_str()))
        .collect();
    assert_eq!(sessions, vec![("MA101", "P1"), ("PH101", "LAB")]);
    assert_eq!(digest.sessions[0].book_name, "Course MA101");
}

#[tokio::test]
async fn test_absentees_with_many_sessions_for_one_student() {
    let storage = memory_storage().await;
    let book = book_with_students(&storage, "CS101", 1, &["s1"]).await;

    // 同一学生同一考勤簿 33000 条缺勤记录
    for start in (0..33_000).step_by(1000) {
        let rows = (start..start + 1000).map(|i| RecordActiveModel {
            book_id: Set(book),
            student_id: Set("s1".to_string()),
            attendance_date: Set("2025-03-03".to_string()),
            session_label: Set(format!("S{i:05}")),
            present: Set(false),
            weighted_count: Set(0),
            created_at: Set(0),
            updated_at: Set(0),
            ..Default::default()
        });
        Records::insert_many(rows)
            .exec_without_returning(&storage.db)
            .await
            .unwrap();
    }

    let absentees = storage.list_absentees_impl(day(3)).await.unwrap();
    assert_eq!(absentees.len(), 1);
    let digest = &absentees["s1"];
    assert_eq!(digest.sessions.len(), 33_000);
    assert_eq!(digest.sessions[0].session_label, "S00000");
    assert_eq!(digest.sessions[0].book_code, "CS101");
}

#[tokio::test]
async fn test_teacher_scoped_book_listing() {
    let storage = memory_storage().await;
    let first = book_with_students(&storage, "CS101", 1, &[]).await;
    book_with_students(&storage, "CS102", 1, &[]).await;

    storage
        .create_teacher_impl(CreateTeacherRequest {
            id: "t1".to_string(),
            full_name: "Teacher One".to_string(),
            department_id: Some("cs".to_string()),
        })
        .await
        .unwrap();
    let teacher = storage.get_teacher_by_id_impl("t1").await.unwrap().unwrap();
    assert_eq!(teacher.full_name, "Teacher One");

    storage
        .set_book_teachers_impl(first, &["t1".to_string()])
        .await
        .unwrap();
    assert!(storage.is_teacher_assigned_impl(first, "t1").await.unwrap());

    let scoped = storage
        .list_books_with_pagination_impl(BookListQuery {
            teacher_id: Some("t1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scoped.pagination.total, 1);
    assert_eq!(scoped.items[0].book_code, "CS101");

    let all = storage
        .list_books_with_pagination_impl(BookListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 2);

    let searched = storage
        .list_books_with_pagination_impl(BookListQuery {
            search: Some("102".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.items.len(), 1);
    assert_eq!(searched.items[0].book_code, "CS102");

    let nobody = storage
        .list_books_with_pagination_impl(BookListQuery {
            teacher_id: Some("t2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(nobody.items.is_empty());
}

#[tokio::test]
async fn test_duplicate_student_is_conflict() {
    let storage = memory_storage().await;
    add_student(&storage, "s1", None).await;

    let err = storage
        .create_student_impl(CreateStudentRequest {
            id: "s1".to_string(),
            full_name: "Again".to_string(),
            parent_phone: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_database_url_inference() {
    assert_eq!(
        SeaOrmStorage::build_database_url("attendance.db").unwrap(),
        "sqlite://attendance.db?mode=rwc"
    );
    assert_eq!(
        SeaOrmStorage::build_database_url("sqlite::memory:").unwrap(),
        "sqlite::memory:"
    );
    assert_eq!(
        SeaOrmStorage::build_database_url("postgres://u:p@localhost/attendance").unwrap(),
        "postgres://u:p@localhost/attendance"
    );
    assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
}
