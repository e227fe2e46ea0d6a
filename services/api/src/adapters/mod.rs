pub mod db;

pub use db::PgCatalogStore;
