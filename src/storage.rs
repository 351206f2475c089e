mod memory;
mod models;
mod postgres;
mod store;

pub use self::{
    memory::MemoryStore,
    models::{ArticleFilter, Stats},
    postgres::{DBPool, SCHEMA, init_db, migrate, new_db_poll},
    store::{Store, seed_categories},
};
