use sha2::{Digest, Sha256};

// separator == "/"
const DOMAIN_SEPARATOR: [u8; 1] = [47];

/// A unique identifier for each state variable in a module.
#[derive(Debug, PartialEq, Eq)]
pub struct ModulePrefix {
    module_path: &'static str,
    module_name: &'static str,
    storage_name: Option<&'static str>,
}

impl ModulePrefix {
    pub fn new_storage(
        module_path: &'static str,
        module_name: &'static str,
        storage_name: &'static str,
    ) -> Self {
        Self {
            module_path,
            module_name,
            storage_name: Some(storage_name),
        }
    }

    pub fn new_module(module_path: &'static str, module_name: &'static str) -> Self {
        Self {
            module_path,
            module_name,
            storage_name: None,
        }
    }

    fn combine_prefix(&self) -> Vec<u8> {
        let storage_name_len = self
            .storage_name
            .map(|name| name.len() + DOMAIN_SEPARATOR.len())
            .unwrap_or_default();

        let mut combined_prefix = Vec::with_capacity(
            self.module_path.len()
                + self.module_name.len()
                + 2 * DOMAIN_SEPARATOR.len()
                + storage_name_len,
        );

        combined_prefix.extend(self.module_path.as_bytes());
        combined_prefix.extend(DOMAIN_SEPARATOR);
        combined_prefix.extend(self.module_name.as_bytes());
        combined_prefix.extend(DOMAIN_SEPARATOR);
        if let Some(storage_name) = self.storage_name {
            combined_prefix.extend(storage_name.as_bytes());
            combined_prefix.extend(DOMAIN_SEPARATOR);
        }
        combined_prefix
    }

    /// SHA-256 of the combined prefix. Used as the address of a module.
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.combine_prefix()).into()
    }
}

impl From<ModulePrefix> for ev_state::Prefix {
    fn from(prefix: ModulePrefix) -> Self {
        ev_state::Prefix::new(prefix.combine_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_prefix_layout() {
        let prefix = ModulePrefix::new_storage("ev_ballot", "Ballot", "elections");
        let state_prefix: ev_state::Prefix = prefix.into();
        assert_eq!(state_prefix.as_bytes(), b"ev_ballot/Ballot/elections/");
    }

    #[test]
    fn module_hash_depends_on_name() {
        let ballot = ModulePrefix::new_module("ev_ballot", "Ballot");
        let registry = ModulePrefix::new_module("ev_voter_registry", "VoterRegistry");
        assert_ne!(ballot.hash(), registry.hash());
        assert_eq!(
            ballot.hash(),
            ModulePrefix::new_module("ev_ballot", "Ballot").hash()
        );
    }
}
