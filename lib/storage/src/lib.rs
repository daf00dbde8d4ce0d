pub mod catalog;
pub mod embeddings;

pub use catalog::{load_catalog, read_catalog, CatalogOptions};
pub use embeddings::{load_embeddings, read_csv, save_embeddings, write_csv, EmbeddingFormat};
