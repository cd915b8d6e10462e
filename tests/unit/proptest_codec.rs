//! Property-based coverage of §8's round-trip claim: decoding bytes that
//! represent a message must reconstruct exactly the fields that went
//! into them, for any value in the field's domain — not just the fixed
//! examples in `codec_tests.rs`.

use matching_engine::wire::{ClientMessage, DecodeOutcome, ExecReport, OrderKind, ServerMessage, Side, Status, Symbol, decode_one, encode};
use proptest::prelude::*;

const MAX_FRAME: usize = 65535;

fn symbol_bytes(s: &str) -> [u8; 10] {
    let mut buf = [0u8; 10];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    buf
}

fn symbol_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{1,10}"
}

fn side_strategy() -> impl Strategy<Value = (Side, u8)> {
    prop_oneof![Just((Side::Buy, 0u8)), Just((Side::Sell, 1u8))]
}

fn kind_strategy() -> impl Strategy<Value = (OrderKind, u8)> {
    prop_oneof![Just((OrderKind::Market, 0u8)), Just((OrderKind::Limit, 1u8))]
}

fn finite_price() -> impl Strategy<Value = f64> {
    (-1_000_000.0f64..1_000_000.0).prop_filter("finite", |p| p.is_finite())
}

proptest! {
    /// Any `'N'` NewOrder frame built from arbitrary in-domain fields
    /// decodes back to exactly those fields.
    #[test]
    fn new_order_round_trips_through_decode(
        client_order_id in any::<u64>(),
        symbol in symbol_strategy(),
        (side, side_byte) in side_strategy(),
        (kind, kind_byte) in kind_strategy(),
        price in finite_price(),
        quantity in any::<u64>(),
    ) {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.push(b'N');
        buf.extend_from_slice(&(5u16 + 36).to_le_bytes());
        buf.extend_from_slice(&client_order_id.to_le_bytes());
        buf.extend_from_slice(&symbol_bytes(&symbol));
        buf.push(side_byte);
        buf.push(kind_byte);
        buf.extend_from_slice(&price.to_le_bytes());
        buf.extend_from_slice(&quantity.to_le_bytes());

        match decode_one(&buf, MAX_FRAME) {
            DecodeOutcome::Message { message, consumed, .. } => {
                prop_assert_eq!(consumed, buf.len());
                match message {
                    ClientMessage::NewOrder {
                        client_order_id: d_id,
                        symbol: d_symbol,
                        side: d_side,
                        kind: d_kind,
                        price: d_price,
                        quantity: d_quantity,
                    } => {
                        prop_assert_eq!(d_id, client_order_id);
                        prop_assert_eq!(d_symbol, Symbol::from_str(&symbol).unwrap());
                        prop_assert_eq!(d_side, side);
                        prop_assert_eq!(d_kind, kind);
                        prop_assert_eq!(d_price, price);
                        prop_assert_eq!(d_quantity, quantity);
                    }
                    _ => prop_assert!(false, "wrong variant decoded"),
                }
            }
            _ => prop_assert!(false, "expected a decoded message"),
        }
    }

    /// Any `'E'` ExecReport, once encoded, has its fields recoverable by
    /// parsing the wire bytes directly (there is no production decoder
    /// for server-to-client frames, since this crate only implements the
    /// server side of the protocol).
    #[test]
    fn exec_report_round_trips_through_encode(
        client_order_id in any::<u64>(),
        execution_id in any::<u64>(),
        symbol in symbol_strategy(),
        (side, side_byte) in side_strategy(),
        price in finite_price(),
        quantity in any::<u64>(),
        filled_qty in any::<u64>(),
    ) {
        let report = ExecReport {
            client_order_id,
            execution_id,
            symbol: Symbol::from_str(&symbol).unwrap(),
            side,
            price,
            quantity,
            filled_qty,
            status: Status::New,
        };
        let mut out = Vec::new();
        encode(&ServerMessage::ExecReport(report), 0, &mut out);

        let total_len = u16::from_le_bytes([out[3], out[4]]);
        prop_assert_eq!(total_len as usize, out.len());
        prop_assert_eq!(out[2], b'E');

        let body = &out[5..];
        prop_assert_eq!(u64::from_le_bytes(body[0..8].try_into().unwrap()), client_order_id);
        prop_assert_eq!(u64::from_le_bytes(body[8..16].try_into().unwrap()), execution_id);
        prop_assert_eq!(&body[16..26], &symbol_bytes(&symbol)[..]);
        prop_assert_eq!(body[26], side_byte);
        prop_assert_eq!(f64::from_le_bytes(body[27..35].try_into().unwrap()), price);
        prop_assert_eq!(u64::from_le_bytes(body[35..43].try_into().unwrap()), quantity);
        prop_assert_eq!(u64::from_le_bytes(body[43..51].try_into().unwrap()), filled_qty);
        prop_assert_eq!(body[51], Status::New.as_u8());
    }
}
