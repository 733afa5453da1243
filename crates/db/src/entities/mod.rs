//! `SeaORM` entities.

pub mod prelude;

pub mod accounts;
pub mod clients;
pub mod movements;
pub mod sea_orm_active_enums;
