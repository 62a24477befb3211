use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// School-assigned identification number, used as the login name
    #[sea_orm(unique)]
    pub no_induk: String,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
    pub school_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Parsed role, `None` when the stored value is not a known role
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school::Entity",
        from = "Column::SchoolId",
        to = "super::school::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    School,
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::school::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    KepalaSekolah,
    Guru,
    Staff,
    Murid,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::KepalaSekolah,
        Role::Guru,
        Role::Staff,
        Role::Murid,
    ];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::KepalaSekolah => write!(f, "kepala_sekolah"),
            Role::Guru => write!(f, "guru"),
            Role::Staff => write!(f, "staff"),
            Role::Murid => write!(f, "murid"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "kepala_sekolah" => Ok(Role::KepalaSekolah),
            "guru" => Ok(Role::Guru),
            "staff" => Ok(Role::Staff),
            "murid" => Ok(Role::Murid),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
