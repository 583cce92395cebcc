//! Generated unit code: a small versioned op stream.
//!
//! ```text
//! magic "FRTU" | version | op*
//! ```
//!
//! Every unit has the same skeleton: resolve, load the handle, optionally cast
//! the receiver, unbox each argument, call with exact types, box the result
//! (or push the void sentinel), return.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

use super::strategy::ResolveStrategy;

const MAGIC: [u8; 4] = *b"FRTU";
const VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
enum Opcode {
    Resolve = 0x01,
    LoadHandle = 0x02,
    CastReceiver = 0x03,
    UnboxArg = 0x04,
    CallExact = 0x05,
    BoxResult = 0x06,
    PushVoid = 0x07,
    Return = 0x08,
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Resolve(ResolveStrategy),
    LoadHandle,
    CastReceiver,
    UnboxArg(u8),
    CallExact(u8),
    BoxResult,
    PushVoid,
    Return,
}

/// Errors decoding or checking unit code.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodeError {
    #[error("bad magic header")]
    BadMagic,

    #[error("unsupported code version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown opcode {0:#04x} at offset {1}")]
    UnknownOpcode(u8, usize),

    #[error("unknown resolve strategy {0}")]
    UnknownStrategy(u8),

    #[error("truncated code at offset {0}")]
    Truncated(usize),

    #[error("malformed unit: {0}")]
    Malformed(String),
}

/// Encoded code of one generated unit.
#[derive(Clone, PartialEq, Eq)]
pub struct UnitCode {
    bytes: Vec<u8>,
}

impl UnitCode {
    pub fn assemble(ops: &[Op]) -> Self {
        let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + ops.len() * 2);
        bytes.extend_from_slice(&MAGIC);
        bytes.push(VERSION);
        for op in ops {
            match *op {
                Op::Resolve(strategy) => {
                    bytes.push(Opcode::Resolve.into());
                    bytes.push(strategy.into());
                }
                Op::LoadHandle => bytes.push(Opcode::LoadHandle.into()),
                Op::CastReceiver => bytes.push(Opcode::CastReceiver.into()),
                Op::UnboxArg(index) => {
                    bytes.push(Opcode::UnboxArg.into());
                    bytes.push(index);
                }
                Op::CallExact(arity) => {
                    bytes.push(Opcode::CallExact.into());
                    bytes.push(arity);
                }
                Op::BoxResult => bytes.push(Opcode::BoxResult.into()),
                Op::PushVoid => bytes.push(Opcode::PushVoid.into()),
                Op::Return => bytes.push(Opcode::Return.into()),
            }
        }
        Self { bytes }
    }

    /// Wrap raw bytes without checking them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn decode(&self) -> Result<Vec<Op>, CodeError> {
        let header = MAGIC.len() + 1;
        if self.bytes.len() < MAGIC.len() || self.bytes[..MAGIC.len()] != MAGIC {
            return Err(CodeError::BadMagic);
        }
        match self.bytes.get(MAGIC.len()) {
            Some(&VERSION) => {}
            Some(&other) => return Err(CodeError::UnsupportedVersion(other)),
            None => return Err(CodeError::Truncated(MAGIC.len())),
        }

        let mut ops = Vec::new();
        let mut pos = header;
        while pos < self.bytes.len() {
            let byte = self.bytes[pos];
            let opcode = Opcode::try_from(byte).map_err(|_| CodeError::UnknownOpcode(byte, pos))?;
            let operand = |at: usize| self.bytes.get(at).copied().ok_or(CodeError::Truncated(at));
            let op = match opcode {
                Opcode::Resolve => {
                    let raw = operand(pos + 1)?;
                    pos += 1;
                    Op::Resolve(ResolveStrategy::try_from(raw).map_err(|_| CodeError::UnknownStrategy(raw))?)
                }
                Opcode::LoadHandle => Op::LoadHandle,
                Opcode::CastReceiver => Op::CastReceiver,
                Opcode::UnboxArg => {
                    let index = operand(pos + 1)?;
                    pos += 1;
                    Op::UnboxArg(index)
                }
                Opcode::CallExact => {
                    let arity = operand(pos + 1)?;
                    pos += 1;
                    Op::CallExact(arity)
                }
                Opcode::BoxResult => Op::BoxResult,
                Opcode::PushVoid => Op::PushVoid,
                Opcode::Return => Op::Return,
            };
            ops.push(op);
            pos += 1;
        }
        Ok(ops)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Resolve(strategy) => write!(f, "resolve {}", strategy),
            Op::LoadHandle => write!(f, "load_handle"),
            Op::CastReceiver => write!(f, "cast_receiver"),
            Op::UnboxArg(index) => write!(f, "unbox_arg {}", index),
            Op::CallExact(arity) => write!(f, "call_exact {}", arity),
            Op::BoxResult => write!(f, "box_result"),
            Op::PushVoid => write!(f, "push_void"),
            Op::Return => write!(f, "return"),
        }
    }
}

/// Disassembly, one op per line.
impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    writeln!(f, "{:04}: {}", i, op)?;
                }
                Ok(())
            }
            Err(err) => write!(f, "<invalid code: {}>", err),
        }
    }
}

impl fmt::Debug for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitCode({} bytes)", self.bytes.len())
    }
}
