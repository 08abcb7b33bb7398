//! Tokenizer abstraction used by the chunker.

use crate::error::{Result, SkinsafeError};
use tiktoken_rs::CoreBPE;

/// Replacement emitted for tokens whose bytes are not valid UTF-8 on their own.
const REPLACEMENT: char = '\u{FFFD}';

/// Converts between text and model tokens.
pub trait TokenCodec: Send + Sync {
    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Vec<usize>;

    /// Decode token ids back into text.
    fn decode(&self, tokens: &[usize]) -> Result<String>;
}

/// `tiktoken` byte-pair encoder.
pub struct TiktokenCodec {
    bpe: CoreBPE,
    encoding: String,
}

impl TiktokenCodec {
    /// Load an encoding by name (`cl100k_base`, `o200k_base`, `p50k_base`, `r50k_base`).
    pub fn new(encoding: &str) -> Result<Self> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(SkinsafeError::Config(format!(
                    "Unknown tokenizer encoding: {}",
                    other
                )))
            }
        }
        .map_err(|e| SkinsafeError::Chunking(format!("Failed to load {}: {}", encoding, e)))?;

        Ok(Self {
            bpe,
            encoding: encoding.to_string(),
        })
    }

    /// The `cl100k_base` encoding used by OpenAI embedding models.
    pub fn cl100k() -> Result<Self> {
        Self::new("cl100k_base")
    }

    /// Encoding name.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl TokenCodec for TiktokenCodec {
    fn encode(&self, text: &str) -> Vec<usize> {
        self.bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|t| t as usize)
            .collect()
    }

    fn decode(&self, tokens: &[usize]) -> Result<String> {
        if let Ok(text) = self.bpe.decode(tokens.iter().map(|&t| t as _).collect()) {
            return Ok(text);
        }

        // A window boundary split a multi-byte character.
        let mut text = String::new();
        for &token in tokens {
            match self.bpe.decode(vec![token as _]) {
                Ok(piece) => text.push_str(&piece),
                Err(_) => text.push(REPLACEMENT),
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cl100k_round_trip() {
        let codec = TiktokenCodec::cl100k().unwrap();
        let text = "Sodium Lauryl Sulfate may irritate skin affected by eczema.";
        let tokens = codec.encode(text);
        assert!(!tokens.is_empty());
        assert!(tokens.len() < text.len());
        assert_eq!(codec.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_special_token_text_is_ordinary() {
        let codec = TiktokenCodec::cl100k().unwrap();
        let text = "see <|endoftext|> in the appendix";
        let tokens = codec.encode(text);
        // cl100k assigns 100257 to <|endoftext|> as a special token.
        assert!(!tokens.contains(&100257));
        assert_eq!(codec.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn test_encoding_name() {
        assert_eq!(TiktokenCodec::cl100k().unwrap().encoding(), "cl100k_base");
        assert_eq!(TiktokenCodec::new("o200k_base").unwrap().encoding(), "o200k_base");
    }

    #[test]
    fn test_unknown_encoding() {
        assert!(matches!(
            TiktokenCodec::new("gpt2-ish"),
            Err(SkinsafeError::Config(_))
        ));
    }

    #[test]
    fn test_split_character_is_replaced() {
        let codec = TiktokenCodec::cl100k().unwrap();
        let tokens = codec.encode("🧴");
        // Emoji are encoded as several byte-level tokens.
        if tokens.len() > 1 {
            let partial = codec.decode(&tokens[..1]).unwrap();
            assert!(partial.contains(REPLACEMENT));
        }
    }
}
