//! Systematic linear block codes used by the reference controller.
//!
//! A codeword stores the data bits in its low bits and the check bits above
//! them. Each codeword bit owns one column of the parity-check matrix,
//! packed into a `u64` with row `j` at bit `j`; the syndrome of a word is the
//! XOR of the columns of its set bits.

use serde::{Deserialize, Serialize};

use crate::dut::{word_mask, MAX_WORD_BITS};
use crate::error::SimError;

/// The error-correcting code family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeKind {
    /// No check bits: errors pass through undetected.
    Identity,
    /// One even-parity bit: single errors are detected, never corrected.
    Parity,
    /// Hsiao SEC-DED: single errors corrected, double errors detected.
    #[default]
    Hsiao,
}

/// Result of decoding one stored word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// The corrected data bits.
    pub data: u64,
    /// The corrected codeword (what a write-back stores).
    pub codeword: u64,
    /// The syndrome was non-zero.
    pub error: bool,
    /// The syndrome was non-zero and no bit was corrected.
    pub uncorrectable: bool,
}

/// A systematic linear block code.
#[derive(Clone, Debug)]
pub struct LinearCode {
    kind: CodeKind,
    data_bits: u32,
    parity_bits: u32,
    /// Parity-check column for every codeword bit.
    columns: Vec<u64>,
    /// Whether a single error in the bit can be corrected.
    correctable: bool,
}

impl LinearCode {
    /// Builds a code protecting `data_bits` bits of data.
    pub fn new(kind: CodeKind, data_bits: u32) -> Result<Self, SimError> {
        if data_bits == 0 {
            return Err(SimError::Unsupported {
                reason: "code with zero data bits".into(),
            });
        }
        let parity_bits = match kind {
            CodeKind::Identity => 0,
            CodeKind::Parity => 1,
            CodeKind::Hsiao => hsiao_check_bits(data_bits),
        };
        let total = data_bits + parity_bits;
        if total > MAX_WORD_BITS {
            return Err(SimError::Unsupported {
                reason: format!(
                    "{kind:?} code over {data_bits} data bits needs {total}-bit words (max {MAX_WORD_BITS})"
                ),
            });
        }

        let columns = match kind {
            CodeKind::Identity => vec![0; data_bits as usize],
            CodeKind::Parity => vec![1; total as usize],
            CodeKind::Hsiao => {
                let mut columns = hsiao_data_columns(parity_bits, data_bits);
                columns.extend((0..parity_bits).map(|j| 1u64 << j));
                columns
            }
        };

        Ok(Self {
            kind,
            data_bits,
            parity_bits,
            columns,
            correctable: kind == CodeKind::Hsiao,
        })
    }

    /// The code family.
    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// Number of data bits.
    pub fn data_bits(&self) -> u32 {
        self.data_bits
    }

    /// Number of check bits.
    pub fn parity_bits(&self) -> u32 {
        self.parity_bits
    }

    /// Codeword width in bits.
    pub fn total_bits(&self) -> u32 {
        self.data_bits + self.parity_bits
    }

    /// Computes the syndrome of a stored word.
    pub fn syndrome(&self, word: u64) -> u64 {
        let mut syndrome = 0;
        let mut bits = word & word_mask(self.total_bits());
        while bits != 0 {
            let i = bits.trailing_zeros();
            syndrome ^= self.columns[i as usize];
            bits &= bits - 1;
        }
        syndrome
    }

    /// Encodes data bits into a codeword.
    pub fn encode(&self, data: u64) -> u64 {
        let data = data & word_mask(self.data_bits);
        data | (self.syndrome(data) << self.data_bits)
    }

    /// Decodes a stored word, correcting it if the code allows.
    pub fn decode(&self, word: u64) -> Decoded {
        let word = word & word_mask(self.total_bits());
        let syndrome = self.syndrome(word);
        let flip = if syndrome != 0 && self.correctable {
            self.columns
                .iter()
                .position(|&col| col == syndrome)
                .map_or(0, |bit| 1u64 << bit)
        } else {
            0
        };
        let codeword = word ^ flip;
        Decoded {
            data: codeword & word_mask(self.data_bits),
            codeword,
            error: syndrome != 0,
            uncorrectable: syndrome != 0 && flip == 0,
        }
    }
}

/// Check bits of a Hsiao code: `m + 1` for the least `m` with
/// `2^m - m - 1 >= data_bits`.
fn hsiao_check_bits(data_bits: u32) -> u32 {
    let mut m = 0u32;
    while (1u64 << m) - u64::from(m) - 1 < u64::from(data_bits) {
        m += 1;
    }
    m + 1
}

/// The first `count` odd-weight columns of weight three or more, lightest
/// first and in ascending order within a weight.
fn hsiao_data_columns(rows: u32, count: u32) -> Vec<u64> {
    let mut columns = Vec::with_capacity(count as usize);
    let mut weight = 3;
    while columns.len() < count as usize && weight <= rows {
        for col in 0..(1u64 << rows) {
            if col.count_ones() == weight {
                columns.push(col);
                if columns.len() == count as usize {
                    break;
                }
            }
        }
        weight += 2;
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsiao_check_bit_counts() {
        assert_eq!(hsiao_check_bits(8), 5);
        assert_eq!(hsiao_check_bits(11), 5);
        assert_eq!(hsiao_check_bits(16), 6);
        assert_eq!(hsiao_check_bits(32), 7);
        assert_eq!(hsiao_check_bits(57), 7);
    }

    #[test]
    fn hsiao_widths() {
        let code = LinearCode::new(CodeKind::Hsiao, 11).unwrap();
        assert_eq!(code.total_bits(), 16);
        let code = LinearCode::new(CodeKind::Hsiao, 32).unwrap();
        assert_eq!(code.total_bits(), 39);
    }

    #[test]
    fn hsiao_columns_distinct_and_odd() {
        let code = LinearCode::new(CodeKind::Hsiao, 26).unwrap();
        let mut cols = code.columns.clone();
        assert!(cols.iter().all(|c| c.count_ones() % 2 == 1));
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), code.total_bits() as usize);
    }

    #[test]
    fn too_wide_rejected() {
        assert!(LinearCode::new(CodeKind::Hsiao, 58).is_err());
        assert!(LinearCode::new(CodeKind::Identity, 65).is_err());
        assert!(LinearCode::new(CodeKind::Parity, 0).is_err());
    }

    #[test]
    fn clean_codewords_decode() {
        let code = LinearCode::new(CodeKind::Hsiao, 11).unwrap();
        for data in [0u64, 1, 0x2aa, 0x7ff] {
            let dec = code.decode(code.encode(data));
            assert_eq!(dec.data, data);
            assert!(!dec.error);
            assert!(!dec.uncorrectable);
        }
    }

    #[test]
    fn hsiao_corrects_every_single_error() {
        let code = LinearCode::new(CodeKind::Hsiao, 11).unwrap();
        let cw = code.encode(0x5a3);
        for bit in 0..code.total_bits() {
            let dec = code.decode(cw ^ (1 << bit));
            assert!(dec.error);
            assert!(!dec.uncorrectable, "bit {bit}");
            assert_eq!(dec.codeword, cw);
            assert_eq!(dec.data, 0x5a3);
        }
    }

    #[test]
    fn hsiao_detects_every_double_error() {
        let code = LinearCode::new(CodeKind::Hsiao, 8).unwrap();
        let cw = code.encode(0x3c);
        let n = code.total_bits();
        for a in 0..n {
            for b in (a + 1)..n {
                let dec = code.decode(cw ^ (1 << a) ^ (1 << b));
                assert!(dec.error);
                assert!(dec.uncorrectable, "bits {a},{b}");
            }
        }
    }

    #[test]
    fn parity_detects_but_never_corrects() {
        let code = LinearCode::new(CodeKind::Parity, 8).unwrap();
        assert_eq!(code.total_bits(), 9);
        let cw = code.encode(0b1011_0001);
        assert_eq!(cw.count_ones() % 2, 0);
        let dec = code.decode(cw ^ 0b100);
        assert!(dec.error);
        assert!(dec.uncorrectable);
        assert!(!code.decode(cw ^ 0b110).error);
    }

    #[test]
    fn identity_never_flags() {
        let code = LinearCode::new(CodeKind::Identity, 16).unwrap();
        assert_eq!(code.encode(0xbeef), 0xbeef);
        let dec = code.decode(0xbeef ^ 0x8001);
        assert!(!dec.error);
        assert_eq!(dec.data, 0xbeef ^ 0x8001);
    }
}
