//! Metadata provider implementations.

pub mod openai;

use anyhow::Result;

use crate::metadata::AssemblyMetadata;

/// A model backend that can describe an assembly. `Ok(None)` means the
/// model judged its inputs uninformative, not that the call failed.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Generate metadata from the assembly's part names.
    async fn from_part_names(
        &self,
        file_name: &str,
        part_names: &[String],
    ) -> Result<Option<AssemblyMetadata>>;

    /// Generate metadata from rendered PNG views of the parts.
    async fn from_images(
        &self,
        file_name: &str,
        images: &[Vec<u8>],
    ) -> Result<Option<AssemblyMetadata>>;

    fn name(&self) -> &str;
}

/// Factory function to create metadata providers.
pub fn create_provider(
    provider_name: &str,
    api_key: Option<String>,
) -> Result<Box<dyn MetadataProvider>> {
    match provider_name {
        "openai" => Ok(Box::new(openai::OpenAiProvider::new(api_key))),
        _ => anyhow::bail!("Unknown metadata provider: {}", provider_name),
    }
}
