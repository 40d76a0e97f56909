//! Binary codec for weighted-threshold signatures.
//!
//! ```text
//! signature := threshold:u16be part+
//! part      := 0x00 weight:u8 r:32 s:32 v:1 kind:u8          (EOA)
//!            | 0x01 weight:u8 address:20                       (non-signing)
//!            | 0x02 weight:u8 address:20 len:u16be sig[len]    (ERC-1271)
//!            | 0x03 weight:u8 threshold:u16be len:u24be part+  (nested)
//! ```

use crate::foundation::util::encoding::u24_be;
use crate::foundation::{
    Result, TrackerError, ADDRESS_SIZE, ECDSA_SIGNATURE_SIZE, MAX_DYNAMIC_SIGNATURE_LEN, MAX_NESTED_PART_LEN, MAX_SIGNATURE_DEPTH,
};
use alloy::primitives::Address;

const FLAG_EOA: u8 = 0x00;
const FLAG_ADDRESS: u8 = 0x01;
const FLAG_ERC1271: u8 = 0x02;
const FLAG_NESTED: u8 = 0x03;

/// How an EOA produced its signature over the digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// Signed the digest as-is.
    Eip712,
    /// Signed the digest wrapped in the `eth_sign` message prefix.
    EthSign,
}

impl SignatureKind {
    pub fn as_byte(self) -> u8 {
        match self {
            SignatureKind::Eip712 => 0x01,
            SignatureKind::EthSign => 0x02,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(SignatureKind::Eip712),
            0x02 => Some(SignatureKind::EthSign),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignaturePart {
    /// A signer that did not sign; it only contributes its address to the configuration.
    Address { weight: u8, address: Address },
    Eoa { weight: u8, signature: [u8; ECDSA_SIGNATURE_SIZE], kind: SignatureKind },
    /// Contract signer validated on-chain through ERC-1271.
    Erc1271 { weight: u8, address: Address, signature: Vec<u8> },
    /// A signer that is itself a configuration.
    Nested { weight: u8, threshold: u16, parts: Vec<SignaturePart> },
}

impl SignaturePart {
    pub fn weight(&self) -> u8 {
        match self {
            SignaturePart::Address { weight, .. }
            | SignaturePart::Eoa { weight, .. }
            | SignaturePart::Erc1271 { weight, .. }
            | SignaturePart::Nested { weight, .. } => *weight,
        }
    }

    pub fn is_signing(&self) -> bool {
        !matches!(self, SignaturePart::Address { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSignature {
    pub threshold: u16,
    pub parts: Vec<SignaturePart>,
}

impl DecodedSignature {
    pub fn new(threshold: u16, parts: Vec<SignaturePart>) -> Self {
        Self { threshold, parts }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode_signature(bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_signature(self)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len()).ok_or_else(|| {
            TrackerError::malformed(format!(
                "truncated {what}: need {len} bytes at offset {}, have {}",
                self.pos,
                self.data.len().saturating_sub(self.pos)
            ))
        })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        let bytes = self.take(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u24(&mut self, what: &str) -> Result<usize> {
        let bytes = self.take(3, what)?;
        Ok(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]) as usize)
    }

    fn address(&mut self, what: &str) -> Result<Address> {
        Ok(Address::from_slice(self.take(ADDRESS_SIZE, what)?))
    }
}

pub fn decode_signature(bytes: &[u8]) -> Result<DecodedSignature> {
    let mut reader = Reader::new(bytes);
    let threshold = reader.u16("threshold")?;
    let parts = decode_parts(&bytes[reader.pos..], 0)?;
    Ok(DecodedSignature { threshold, parts })
}

fn decode_parts(data: &[u8], depth: usize) -> Result<Vec<SignaturePart>> {
    let mut reader = Reader::new(data);
    let mut parts = Vec::new();
    while !reader.is_empty() {
        let flag = reader.u8("part flag")?;
        let part = match flag {
            FLAG_EOA => {
                let weight = reader.u8("eoa weight")?;
                let mut signature = [0u8; ECDSA_SIGNATURE_SIZE];
                signature.copy_from_slice(reader.take(ECDSA_SIGNATURE_SIZE, "eoa signature")?);
                let kind_byte = reader.u8("eoa signature kind")?;
                let kind = SignatureKind::from_byte(kind_byte)
                    .ok_or_else(|| TrackerError::malformed(format!("unknown eoa signature kind {kind_byte:#04x}")))?;
                SignaturePart::Eoa { weight, signature, kind }
            }
            FLAG_ADDRESS => {
                let weight = reader.u8("address weight")?;
                let address = reader.address("address")?;
                SignaturePart::Address { weight, address }
            }
            FLAG_ERC1271 => {
                let weight = reader.u8("erc1271 weight")?;
                let address = reader.address("erc1271 address")?;
                let len = reader.u16("erc1271 length")? as usize;
                let signature = reader.take(len, "erc1271 signature")?.to_vec();
                SignaturePart::Erc1271 { weight, address, signature }
            }
            FLAG_NESTED => {
                let weight = reader.u8("nested weight")?;
                let threshold = reader.u16("nested threshold")?;
                let len = reader.u24("nested length")?;
                let body = reader.take(len, "nested parts")?;
                if depth + 1 >= MAX_SIGNATURE_DEPTH {
                    return Err(TrackerError::malformed(format!("nesting exceeds max depth {MAX_SIGNATURE_DEPTH}")));
                }
                let parts = decode_parts(body, depth + 1)?;
                SignaturePart::Nested { weight, threshold, parts }
            }
            other => return Err(TrackerError::malformed(format!("unknown part flag {other:#04x} at offset {}", reader.pos - 1))),
        };
        parts.push(part);
    }
    if parts.is_empty() {
        return Err(TrackerError::malformed("signature has no parts"));
    }
    Ok(parts)
}

pub fn encode_signature(signature: &DecodedSignature) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&signature.threshold.to_be_bytes());
    encode_parts(&signature.parts, 0, &mut out)?;
    Ok(out)
}

fn encode_parts(parts: &[SignaturePart], depth: usize, out: &mut Vec<u8>) -> Result<()> {
    if parts.is_empty() {
        return Err(TrackerError::malformed("signature has no parts"));
    }
    for part in parts {
        match part {
            SignaturePart::Eoa { weight, signature, kind } => {
                out.push(FLAG_EOA);
                out.push(*weight);
                out.extend_from_slice(signature);
                out.push(kind.as_byte());
            }
            SignaturePart::Address { weight, address } => {
                out.push(FLAG_ADDRESS);
                out.push(*weight);
                out.extend_from_slice(address.as_slice());
            }
            SignaturePart::Erc1271 { weight, address, signature } => {
                if signature.len() > MAX_DYNAMIC_SIGNATURE_LEN {
                    return Err(TrackerError::malformed(format!("erc1271 signature too long: {} bytes", signature.len())));
                }
                out.push(FLAG_ERC1271);
                out.push(*weight);
                out.extend_from_slice(address.as_slice());
                out.extend_from_slice(&(signature.len() as u16).to_be_bytes());
                out.extend_from_slice(signature);
            }
            SignaturePart::Nested { weight, threshold, parts } => {
                if depth + 1 >= MAX_SIGNATURE_DEPTH {
                    return Err(TrackerError::malformed(format!("nesting exceeds max depth {MAX_SIGNATURE_DEPTH}")));
                }
                let mut body = Vec::new();
                encode_parts(parts, depth + 1, &mut body)?;
                let len = u24_be(body.len())
                    .ok_or_else(|| TrackerError::malformed(format!("nested part too long: {} > {MAX_NESTED_PART_LEN}", body.len())))?;
                out.push(FLAG_NESTED);
                out.push(*weight);
                out.extend_from_slice(&threshold.to_be_bytes());
                out.extend_from_slice(&len);
                out.extend_from_slice(&body);
            }
        }
    }
    Ok(())
}
