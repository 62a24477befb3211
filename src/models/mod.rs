pub mod category;
pub mod item;
pub mod item_history;
pub mod item_transfer;
pub mod room;
pub mod room_status;
pub mod room_type;
pub mod school;
pub mod session;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::category::{self, Entity as Category};
    pub use super::item::{self, Entity as Item};
    pub use super::item_history::{self, Entity as ItemHistory};
    pub use super::item_transfer::{self, Entity as ItemTransfer};
    pub use super::room::{self, Entity as Room};
    pub use super::room_status::{self, Entity as RoomStatus};
    pub use super::room_type::{self, Entity as RoomType};
    pub use super::school::{self, Entity as School};
    pub use super::session::{self, Entity as Session};
    pub use super::user::{self, Entity as User};
}
