//! SeaORM entity models
//!
//! Database entities for Glossify

mod paper;
mod user;

pub use paper::{
    Entity as PaperEntity,
    Model as PaperRow,
    ActiveModel as PaperActiveModel,
    Column as PaperColumn,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};
