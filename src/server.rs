//! Modbus TCP front end.
//!
//! Serves read/write holding-register requests against the unit banks in
//! [`SimContext`]. Reads and writes use their distinct standard function
//! codes (0x03 / 0x06 / 0x10); malformed or out-of-range requests get the
//! matching Modbus exception response instead of tearing the connection
//! down. The server task is independent of the simulators: a bind failure
//! kills only this task, and the banks keep updating with no client
//! connected.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::SimContext;
use crate::registers::RegisterError;

/// Reference default bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5020";

const FC_READ_HOLDING: u8 = 0x03;
const FC_WRITE_SINGLE: u8 = 0x06;
const FC_WRITE_MULTIPLE: u8 = 0x10;

const EX_ILLEGAL_FUNCTION: u8 = 0x01;
const EX_ILLEGAL_DATA_ADDRESS: u8 = 0x02;
const EX_ILLEGAL_DATA_VALUE: u8 = 0x03;
const EX_GATEWAY_TARGET_FAILED: u8 = 0x0B;

/// Per-request register caps from the Modbus specification.
const MAX_READ_COUNT: usize = 125;
const MAX_WRITE_COUNT: usize = 123;

/// Largest legal MBAP length field: unit id + 253-byte PDU.
const MAX_FRAME_LENGTH: usize = 254;

/// Accept connections on `bind` and service them until shutdown fires.
pub async fn serve(
    context: Arc<SimContext>,
    bind: &str,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(%bind, "register server listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(%addr, "client connected");
                    let client_context = Arc::clone(&context);
                    tokio::spawn(async move {
                        match handle_client(stream, client_context).await {
                            Ok(()) => info!(%addr, "client disconnected"),
                            Err(e) => warn!(%addr, error = %e, "client session ended"),
                        }
                    });
                }
                Err(e) => error!(error = %e, "failed to accept connection"),
            },
            changed = shutdown.changed() => {
                // A dropped sender counts as a stop request
                if changed.is_err() || *shutdown.borrow() {
                    info!("register server stopping");
                    return Ok(());
                }
            }
        }
    }
}

/// Request/response loop for one client connection.
async fn handle_client(mut stream: TcpStream, context: Arc<SimContext>) -> std::io::Result<()> {
    // MBAP header: transaction id (2), protocol id (2), length (2), unit (1)
    let mut header = [0u8; 7];
    loop {
        match stream.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        }
        let length = usize::from(u16::from_be_bytes([header[4], header[5]]));
        if length < 2 || length > MAX_FRAME_LENGTH {
            // Unrecoverable framing corruption; drop the session.
            warn!(length, "malformed MBAP length, closing connection");
            return Ok(());
        }
        let unit = header[6];
        let mut pdu = vec![0u8; length - 1];
        stream.read_exact(&mut pdu).await?;

        let response = handle_request(&context, unit, &pdu);
        let mut frame = Vec::with_capacity(7 + response.len());
        frame.extend_from_slice(&header[..4]);
        frame.extend_from_slice(&((response.len() + 1) as u16).to_be_bytes());
        frame.push(unit);
        frame.extend_from_slice(&response);
        stream.write_all(&frame).await?;
    }
}

/// Execute one request PDU against the addressed unit's bank and return the
/// response PDU, exception responses included.
///
/// Pure over the context, so tests exercise the whole request path without
/// a socket.
#[must_use]
pub fn handle_request(context: &SimContext, unit: u8, pdu: &[u8]) -> Vec<u8> {
    let Some((&function, body)) = pdu.split_first() else {
        return exception(0, EX_ILLEGAL_FUNCTION);
    };
    let Some(bank) = context.bank(unit) else {
        return exception(function, EX_GATEWAY_TARGET_FAILED);
    };
    match function {
        FC_READ_HOLDING => read_holding(bank, function, body),
        FC_WRITE_SINGLE => write_single(bank, function, body),
        FC_WRITE_MULTIPLE => write_multiple(bank, function, body),
        _ => exception(function, EX_ILLEGAL_FUNCTION),
    }
}

fn exception(function: u8, code: u8) -> Vec<u8> {
    vec![function | 0x80, code]
}

fn read_holding(bank: &crate::registers::RegisterBank, function: u8, body: &[u8]) -> Vec<u8> {
    if body.len() != 4 {
        return exception(function, EX_ILLEGAL_DATA_VALUE);
    }
    let offset = usize::from(u16::from_be_bytes([body[0], body[1]]));
    let count = usize::from(u16::from_be_bytes([body[2], body[3]]));
    if count == 0 || count > MAX_READ_COUNT {
        return exception(function, EX_ILLEGAL_DATA_VALUE);
    }
    match bank.get(offset, count) {
        Ok(values) => {
            let mut out = Vec::with_capacity(2 + values.len() * 2);
            out.push(function);
            out.push((values.len() * 2) as u8);
            for value in values {
                out.extend_from_slice(&value.to_be_bytes());
            }
            out
        }
        Err(RegisterError::OutOfRange { .. }) => exception(function, EX_ILLEGAL_DATA_ADDRESS),
    }
}

fn write_single(bank: &crate::registers::RegisterBank, function: u8, body: &[u8]) -> Vec<u8> {
    if body.len() != 4 {
        return exception(function, EX_ILLEGAL_DATA_VALUE);
    }
    let offset = usize::from(u16::from_be_bytes([body[0], body[1]]));
    let value = u16::from_be_bytes([body[2], body[3]]);
    match bank.set(offset, &[value]) {
        // Response echoes the request
        Ok(()) => {
            let mut out = Vec::with_capacity(5);
            out.push(function);
            out.extend_from_slice(body);
            out
        }
        Err(RegisterError::OutOfRange { .. }) => exception(function, EX_ILLEGAL_DATA_ADDRESS),
    }
}

fn write_multiple(bank: &crate::registers::RegisterBank, function: u8, body: &[u8]) -> Vec<u8> {
    if body.len() < 5 {
        return exception(function, EX_ILLEGAL_DATA_VALUE);
    }
    let offset = usize::from(u16::from_be_bytes([body[0], body[1]]));
    let count = usize::from(u16::from_be_bytes([body[2], body[3]]));
    let byte_count = usize::from(body[4]);
    let data = &body[5..];
    if count == 0 || count > MAX_WRITE_COUNT || byte_count != count * 2 || data.len() != byte_count {
        return exception(function, EX_ILLEGAL_DATA_VALUE);
    }
    let values: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    match bank.set(offset, &values) {
        Ok(()) => {
            let mut out = Vec::with_capacity(5);
            out.push(function);
            out.extend_from_slice(&body[..4]);
            out
        }
        Err(RegisterError::OutOfRange { .. }) => exception(function, EX_ILLEGAL_DATA_ADDRESS),
    }
}
