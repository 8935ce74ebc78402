use crate::memory::page_table::Address;
use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;

/// One memory access from a process trace: `<op> <register> <hex address>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub op: char,
    pub register: String,
    pub virtual_address: Address,
}

/// Parsed trace. Parsing stops at the first malformed line, which is kept so
/// the simulator can report it.
#[derive(Debug, Default)]
pub struct Trace {
    pub instructions: Vec<Instruction>,
    /// 1-based line number and reason.
    pub malformed: Option<(usize, String)>,
}

pub fn parse_instruction(line: &str) -> Result<Instruction> {
    let mut tokens = line.split_whitespace();
    let (op, register, address) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(op), Some(reg), Some(addr)) => (op, reg, addr),
        _ => bail!("expected '<op> <register> <address>', got '{}'", line.trim()),
    };

    let mut op_chars = op.chars();
    let op = match (op_chars.next(), op_chars.next()) {
        (Some(c), None) => c,
        _ => bail!("operation must be a single character, got '{}'", op),
    };
    if register.chars().count() > 2 {
        bail!("register name '{}' is longer than 2 characters", register);
    }
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let virtual_address = Address::from_str_radix(digits, 16)
        .map_err(|e| anyhow!("invalid hex address '{}': {}", address, e))?;

    Ok(Instruction {
        op,
        register: register.to_string(),
        virtual_address,
    })
}

/// Parse a whole trace. Blank lines are skipped; a line that is not valid
/// UTF-8 counts as malformed.
pub fn parse_trace<B: AsRef<[u8]>>(content: B) -> Trace {
    let mut trace = Trace::default();
    for (idx, raw) in content.as_ref().split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let parsed = std::str::from_utf8(raw)
            .map_err(|e| anyhow!("line is not valid UTF-8: {}", e))
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    parse_instruction(line).map(Some)
                }
            });
        match parsed {
            Ok(Some(ins)) => trace.instructions.push(ins),
            Ok(None) => {}
            Err(e) => {
                trace.malformed = Some((idx + 1, e.to_string()));
                break;
            }
        }
    }
    trace
}

/// Read a trace file. Only a failure to read the file is an error; bad
/// content is reported through `Trace::malformed`.
pub async fn load_trace<P: AsRef<Path>>(path: P) -> Result<Trace> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("opening trace file {:?}", path))?;
    Ok(parse_trace(content))
}
