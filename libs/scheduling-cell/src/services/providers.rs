use tracing::debug;

use crate::models::Provider;

/// Remote path for the provider list.
pub const PROVIDERS_PATH: &str = "providers";

/// Session-wide provider list, fetched once at session start and replaced
/// wholesale on refresh. On a failed refresh the previous list stays in
/// place.
#[derive(Debug, Clone, Default)]
pub struct ProviderDirectory {
    providers: Vec<Provider>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, providers: Vec<Provider>) {
        debug!("Loaded {} providers", providers.len());
        self.providers = providers;
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.providers.iter().any(|p| p.id == provider_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: format!("Provider {}", id),
            avatar_url: format!("https://cdn.example.com/avatars/{}.png", id),
        }
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut directory = ProviderDirectory::new();
        directory.replace(vec![provider("a"), provider("b")]);
        assert_eq!(directory.providers().len(), 2);

        directory.replace(vec![provider("c")]);
        assert_eq!(directory.providers().len(), 1);
        assert!(directory.contains("c"));
        assert!(!directory.contains("a"));
    }
}
