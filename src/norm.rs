pub mod aggregate;
pub mod distance;
pub mod join;
pub mod lobanov;
pub mod nearey;
pub mod outliers;
pub mod output;
pub mod pipeline;
pub mod reshape;
pub mod stats;
pub mod watt_fabricius;

#[cfg(test)]
mod testutil;
