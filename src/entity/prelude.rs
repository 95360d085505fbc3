//! 预导入模块，方便使用

pub use super::attendance_books::{
    ActiveModel as AttendanceBookActiveModel, Entity as AttendanceBooks,
    Model as AttendanceBookModel,
};
pub use super::attendance_records::{
    ActiveModel as AttendanceRecordActiveModel, Entity as AttendanceRecords,
    Model as AttendanceRecordModel,
};
pub use super::book_students::{
    ActiveModel as BookStudentActiveModel, Entity as BookStudents, Model as BookStudentModel,
};
pub use super::book_teachers::{
    ActiveModel as BookTeacherActiveModel, Entity as BookTeachers, Model as BookTeacherModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::teachers::{
    ActiveModel as TeacherActiveModel, Entity as Teachers, Model as TeacherModel,
};
