mod connection;
pub mod repositories;
pub mod schema;

pub use connection::ConnectionPool;

use std::path::Path;

use crate::error::Result;

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    schema::init_schema(&pool.get_connection())?;
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    schema::init_schema(&pool.get_connection())?;
    Ok(pool)
}
