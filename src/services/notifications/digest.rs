//! 缺勤短信正文生成
//!
//! 固定模板：`Dear Parent, {name} ({id}) was absent for {n} session(s): {sessions} on {date}.`
//!
//! 开启字段截断时按短信长度预算裁剪：姓名 20 字符、学号 15 字符、节数 1 位（最多 9）、
//! 节次列表 14 字符、日期 `dd-mm-yy`。截断按字符计数。

use chrono::NaiveDate;

use crate::models::attendance::responses::{AbsenteeDigest, AbsenteeMap};
use crate::models::notifications::entities::AbsenceMessage;

const NAME_LIMIT: usize = 20;
const ID_LIMIT: usize = 15;
const SESSIONS_LIMIT: usize = 14;
const MAX_SESSION_COUNT: usize = 9;

/// 生成结果：可发送的短信与缺少家长手机号的学生
#[derive(Debug, Default)]
pub struct ComposedMessages {
    pub messages: Vec<AbsenceMessage>,
    pub skipped: Vec<String>,
}

fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// 单个学生的短信正文
pub fn render_body(digest: &AbsenteeDigest, date: NaiveDate, truncate_fields: bool) -> String {
    let sessions = digest
        .sessions
        .iter()
        .map(|s| s.session_label.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let count = digest.sessions.len();

    if truncate_fields {
        format!(
            "Dear Parent, {} ({}) was absent for {} session(s): {} on {}.",
            truncate_chars(&digest.full_name, NAME_LIMIT),
            truncate_chars(&digest.student_id, ID_LIMIT),
            count.min(MAX_SESSION_COUNT),
            truncate_chars(&sessions, SESSIONS_LIMIT),
            date.format("%d-%m-%y"),
        )
    } else {
        format!(
            "Dear Parent, {} ({}) was absent for {} session(s): {} on {}.",
            digest.full_name,
            digest.student_id,
            count,
            sessions,
            date.format("%Y-%m-%d"),
        )
    }
}

/// 为缺勤名单中的每个学生生成一条短信
pub fn compose_absence_messages(
    absentees: &AbsenteeMap,
    date: NaiveDate,
    truncate_fields: bool,
) -> ComposedMessages {
    let mut composed = ComposedMessages::default();

    for digest in absentees.values() {
        let phone = digest
            .parent_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        match phone {
            Some(phone) => composed.messages.push(AbsenceMessage {
                student_id: digest.student_id.clone(),
                recipient_phone: phone.to_string(),
                body: render_body(digest, date, truncate_fields),
            }),
            None => composed.skipped.push(digest.student_id.clone()),
        }
    }

    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::responses::AbsentSession;

    fn digest(id: &str, name: &str, phone: Option<&str>, labels: &[&str]) -> AbsenteeDigest {
        AbsenteeDigest {
            student_id: id.to_string(),
            full_name: name.to_string(),
            parent_phone: phone.map(str::to_string),
            sessions: labels
                .iter()
                .map(|label| AbsentSession {
                    book_code: "CS101".to_string(),
                    book_name: "Programming".to_string(),
                    session_label: label.to_string(),
                })
                .collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_plain_body() {
        let body = render_body(&digest("s1", "Asha Rai", None, &["P1", "P2"]), date(), false);
        assert_eq!(
            body,
            "Dear Parent, Asha Rai (s1) was absent for 2 session(s): P1,P2 on 2025-03-04."
        );
    }

    #[test]
    fn test_truncated_fields() {
        let long = digest(
            "STU-2025-000000012345",
            "Bartholomew Alexander Featherstonehaugh",
            None,
            &["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9", "P10"],
        );
        let body = render_body(&long, date(), true);
        assert_eq!(
            body,
            "Dear Parent, Bartholomew Alexande (STU-2025-000000) was absent for 9 session(s): P1,P2,P3,P4,P5 on 04-03-25."
        );
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let d = digest("s1", "ŠťastnýŠťastnýŠťastnýŠťastný", None, &["P1"]);
        let body = render_body(&d, date(), true);
        assert!(body.contains("Dear Parent, ŠťastnýŠťastnýŠťastn (s1)"));
    }

    #[test]
    fn test_missing_phone_is_skipped() {
        let mut absentees = AbsenteeMap::new();
        absentees.insert("s1".into(), digest("s1", "One", Some(" 9800000001 "), &["P1"]));
        absentees.insert("s2".into(), digest("s2", "Two", None, &["P1"]));
        absentees.insert("s3".into(), digest("s3", "Three", Some("  "), &["P2"]));

        let composed = compose_absence_messages(&absentees, date(), true);
        assert_eq!(composed.messages.len(), 1);
        assert_eq!(composed.messages[0].recipient_phone, "9800000001");
        assert_eq!(composed.skipped, vec!["s2".to_string(), "s3".to_string()]);
    }
}
