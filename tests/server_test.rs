//! Request-level tests for the Modbus front end, exercising
//! `server::handle_request` without a socket.

use fieldsim::context::{SimContext, BREAKER_UNIT};
use fieldsim::registers::{motor, MOTOR_REGISTERS};
use fieldsim::server::handle_request;

fn read_request(offset: u16, count: u16) -> Vec<u8> {
    let mut pdu = vec![0x03];
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(&count.to_be_bytes());
    pdu
}

fn write_multiple_request(offset: u16, values: &[u16]) -> Vec<u8> {
    let mut pdu = vec![0x10];
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(&(values.len() as u16).to_be_bytes());
    pdu.push((values.len() * 2) as u8);
    for value in values {
        pdu.extend_from_slice(&value.to_be_bytes());
    }
    pdu
}

#[test]
fn test_read_holding_returns_full_motor_map() {
    let ctx = SimContext::new();
    let state = [1, 1, 0, 50, 50, 63, 72, 0, 4, 0, 0, 14];
    ctx.motor(1).unwrap().set(0, &state).unwrap();

    let response = handle_request(&ctx, 1, &read_request(0, MOTOR_REGISTERS as u16));
    assert_eq!(response[0], 0x03);
    assert_eq!(response[1], 24);
    let decoded: Vec<u16> = response[2..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(decoded, state.to_vec());
}

#[test]
fn test_write_single_echoes_and_lands() {
    let ctx = SimContext::new();
    let response = handle_request(&ctx, 2, &[0x06, 0x00, 0x03, 0x00, 0x32]);
    assert_eq!(response, vec![0x06, 0x00, 0x03, 0x00, 0x32]);
    assert_eq!(ctx.motor(2).unwrap().get_one(motor::SP).unwrap(), 50);
}

#[test]
fn test_write_multiple_then_read_back() {
    let ctx = SimContext::new();
    let values = [1, 3, 230, 47];
    let response = handle_request(&ctx, BREAKER_UNIT, &write_multiple_request(4, &values));
    assert_eq!(response, vec![0x10, 0x00, 0x04, 0x00, 0x04]);

    let read = handle_request(&ctx, BREAKER_UNIT, &read_request(4, 4));
    let decoded: Vec<u16> = read[2..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(decoded, values.to_vec());
}

#[test]
fn test_unknown_unit_gets_gateway_exception() {
    let ctx = SimContext::new();
    let response = handle_request(&ctx, 9, &read_request(0, 1));
    assert_eq!(response, vec![0x83, 0x0B]);
}

#[test]
fn test_out_of_range_address_gets_exception() {
    let ctx = SimContext::new();
    // Motor bank has 12 registers
    assert_eq!(handle_request(&ctx, 1, &read_request(10, 5)), vec![0x83, 0x02]);
    assert_eq!(
        handle_request(&ctx, 1, &[0x06, 0x00, 0x0C, 0x00, 0x01]),
        vec![0x86, 0x02]
    );
    // Failed write left nothing behind
    assert_eq!(
        ctx.motor(1).unwrap().get(0, MOTOR_REGISTERS).unwrap(),
        vec![0; MOTOR_REGISTERS]
    );
}

#[test]
fn test_unsupported_function_rejected() {
    let ctx = SimContext::new();
    let response = handle_request(&ctx, 1, &[0x05, 0x00, 0x00, 0xFF, 0x00]);
    assert_eq!(response, vec![0x85, 0x01]);
}

#[test]
fn test_malformed_requests_get_value_exception() {
    let ctx = SimContext::new();
    // Zero-count read
    assert_eq!(handle_request(&ctx, 1, &read_request(0, 0)), vec![0x83, 0x03]);
    // Truncated read body
    assert_eq!(handle_request(&ctx, 1, &[0x03, 0x00]), vec![0x83, 0x03]);
    // Byte count disagrees with register count
    let mut bad = write_multiple_request(0, &[1, 2]);
    bad[5] = 0xFF;
    bad.truncate(6);
    assert_eq!(handle_request(&ctx, 1, &bad)[1], 0x03);
}
