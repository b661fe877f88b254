use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// One decoded swap, as emitted by a Uniswap-V2-style pair contract.
///
/// `(transaction, log_idx)` is the natural key: a log index is unique within
/// its block and the transaction hash pins the block. A swap reports either
/// the "in" or the "out" amount per token slot, so two of the four amounts
/// are normally zero.
///
/// Fields are declared in lexicographic order: serde emits struct keys in
/// declaration order and the on-disk document keeps sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    #[serde(with = "u256_int")]
    pub amnt_0_in: U256,
    #[serde(with = "u256_int")]
    pub amnt_0_out: U256,
    #[serde(with = "u256_int")]
    pub amnt_1_in: U256,
    #[serde(with = "u256_int")]
    pub amnt_1_out: U256,
    pub block: u64,
    pub log_idx: u64,
    pub receiver: Address,
    pub sender: Address,
    pub transaction: B256,
}

impl SwapEvent {
    /// Natural key within a single retrieval run.
    pub fn key(&self) -> (B256, u64) {
        (self.transaction, self.log_idx)
    }
}

/// Amounts as plain JSON integers, full precision.
///
/// On-chain amounts are 256-bit, so they must not pass through a fixed-width
/// numeric type. Relies on serde_json's `arbitrary_precision` feature;
/// without it, integers above 2^53 would round through f64.
mod u256_int {
    use alloy::primitives::U256;
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        let number: serde_json::Number =
            serde_json::from_str(&value.to_string()).map_err(ser::Error::custom)?;

        number.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;

        U256::from_str_radix(&number.to_string(), 10).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SwapEvent {
        SwapEvent {
            amnt_0_in: U256::from(5u64),
            amnt_0_out: U256::ZERO,
            amnt_1_in: U256::ZERO,
            amnt_1_out: U256::from(1u8) << 130,
            block: 11_149_596,
            log_idx: 7,
            receiver: Address::repeat_byte(0xbb),
            sender: Address::repeat_byte(0xaa),
            transaction: B256::repeat_byte(0x11),
        }
    }

    #[test]
    fn record_keys_are_sorted() {
        let json = serde_json::to_string(&sample()).unwrap();

        let keys = [
            "\"amnt_0_in\"",
            "\"amnt_0_out\"",
            "\"amnt_1_in\"",
            "\"amnt_1_out\"",
            "\"block\"",
            "\"log_idx\"",
            "\"receiver\"",
            "\"sender\"",
            "\"transaction\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|key| json.find(key).unwrap()).collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{json}");
    }

    #[test]
    fn amounts_are_unquoted_integers() {
        let json = serde_json::to_string(&sample()).unwrap();

        // 2^130, far beyond u64, digit-exact and not a string
        assert!(json.contains("\"amnt_1_out\":1361129467683753853853498429727072845824"));
        assert!(json.contains("\"amnt_0_in\":5"));
    }

    #[test]
    fn serde_round_trip_is_lossless() {
        let event = sample();
        let json = serde_json::to_string(&event).unwrap();
        let back: SwapEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(back, event);
    }
}
