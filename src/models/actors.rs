use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 调用者角色（由上游认证网关写入请求头）
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "actor.ts")]
pub enum ActorRole {
    Teacher, // 教师
    Hod,     // 系主任
    Admin,   // 管理员
}

impl ActorRole {
    pub const TEACHER: &'static str = "teacher";
    pub const HOD: &'static str = "hod";
    pub const ADMIN: &'static str = "admin";

    pub fn admin_roles() -> &'static [&'static ActorRole] {
        &[&Self::Admin]
    }
    pub fn marking_roles() -> &'static [&'static ActorRole] {
        &[&Self::Teacher, &Self::Admin]
    }
    pub fn report_roles() -> &'static [&'static ActorRole] {
        &[&Self::Hod, &Self::Admin]
    }
    pub fn all_roles() -> &'static [&'static ActorRole] {
        &[&Self::Teacher, &Self::Hod, &Self::Admin]
    }
}

impl<'de> Deserialize<'de> for ActorRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<ActorRole>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Teacher => write!(f, "{}", ActorRole::TEACHER),
            ActorRole::Hod => write!(f, "{}", ActorRole::HOD),
            ActorRole::Admin => write!(f, "{}", ActorRole::ADMIN),
        }
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ActorRole::TEACHER => Ok(ActorRole::Teacher),
            ActorRole::HOD => Ok(ActorRole::Hod),
            ActorRole::ADMIN => Ok(ActorRole::Admin),
            _ => Err(format!(
                "Invalid actor role: '{s}'. Supported roles: teacher, hod, admin"
            )),
        }
    }
}

// 当前请求的调用者
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.role == ActorRole::Teacher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<ActorRole>(), Ok(ActorRole::Admin));
        assert_eq!(" teacher ".parse::<ActorRole>(), Ok(ActorRole::Teacher));
        assert_eq!("HOD".parse::<ActorRole>(), Ok(ActorRole::Hod));
        assert!("student".parse::<ActorRole>().is_err());
    }

    #[test]
    fn test_role_display_round_trips() {
        for role in ActorRole::all_roles() {
            assert_eq!(role.to_string().parse::<ActorRole>().as_ref(), Ok(*role));
        }
    }
}
