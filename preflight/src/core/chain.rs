//! Chain key normalization and pair labels.

/// Lower-case and trim a chain key.
pub fn normalize_chain(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Upper-case the first character for human-readable detail lines.
pub fn title_chain(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A (local, peer) pair whose two directions are correlated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPair {
    pub local: String,
    pub peer: String,
}

impl ChainPair {
    pub fn new(local: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            peer: peer.into(),
        }
    }

    /// Lookup key of the local -> peer record.
    pub fn forward_key(&self) -> String {
        direction_key(&self.local, &self.peer)
    }

    /// Lookup key of the peer -> local record.
    pub fn reverse_key(&self) -> String {
        direction_key(&self.peer, &self.local)
    }

    /// `solana<->eth`
    pub fn label(&self) -> String {
        format!("{}<->{}", self.local, self.peer)
    }

    /// `Solana<->Eth`
    pub fn title(&self) -> String {
        format!("{}<->{}", title_chain(&self.local), title_chain(&self.peer))
    }

    /// `Solana->Eth`
    pub fn forward_title(&self) -> String {
        format!("{}->{}", title_chain(&self.local), title_chain(&self.peer))
    }

    /// `Eth->Solana`
    pub fn reverse_title(&self) -> String {
        format!("{}->{}", title_chain(&self.peer), title_chain(&self.local))
    }
}

pub fn direction_key(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}

/// Build the pair list for every expected peer, in declaration order.
pub fn expected_pairs(local: &str, peers: &[String]) -> Vec<ChainPair> {
    peers
        .iter()
        .map(|peer| ChainPair::new(local, peer.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_chain("  Ethereum "), "ethereum");
    }

    #[test]
    fn title_handles_empty_and_ascii() {
        assert_eq!(title_chain(""), "");
        assert_eq!(title_chain("eth"), "Eth");
    }

    #[test]
    fn pair_keys_and_titles() {
        let pair = ChainPair::new("solana", "eth");
        assert_eq!(pair.forward_key(), "solana->eth");
        assert_eq!(pair.reverse_key(), "eth->solana");
        assert_eq!(pair.label(), "solana<->eth");
        assert_eq!(pair.title(), "Solana<->Eth");
        assert_eq!(pair.forward_title(), "Solana->Eth");
        assert_eq!(pair.reverse_title(), "Eth->Solana");
    }
}
