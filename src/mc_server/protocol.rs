//! Server List Ping wire primitives.
//!
//! The status protocol frames every packet with a VarInt length prefix;
//! strings are VarInt-length-prefixed UTF-8.

use std::io::{self, Read, Write};

fn decode_varint(mut next: impl FnMut() -> io::Result<u8>) -> io::Result<i32> {
    let mut value = 0i32;
    let mut shift = 0;
    loop {
        let byte = next()?;
        value |= ((byte & 0x7f) as i32) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 35 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "VarInt is too long",
            ));
        }
    }
}

/// Append a VarInt to a buffer.
pub fn put_varint(buf: &mut Vec<u8>, value: i32) {
    // Negative values encode as their two's-complement bit pattern.
    let mut value = value as u32;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode a VarInt from the front of a slice, advancing it.
pub fn get_varint(input: &mut &[u8]) -> io::Result<i32> {
    decode_varint(|| {
        let (&byte, rest) = input.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "truncated VarInt")
        })?;
        *input = rest;
        Ok(byte)
    })
}

/// Decode a VarInt from a stream, one byte at a time.
pub fn read_varint<R: Read>(reader: &mut R) -> io::Result<i32> {
    decode_varint(|| {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        Ok(byte[0])
    })
}

/// Append a length-prefixed UTF-8 string to a buffer.
pub fn put_string(buf: &mut Vec<u8>, s: &str) {
    put_varint(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

/// Decode a length-prefixed string from the front of a slice, advancing it.
pub fn get_string(input: &mut &[u8]) -> io::Result<String> {
    let len = get_varint(input)?;
    if len < 0 || input.len() < len as usize {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string length exceeds payload",
        ));
    }
    let (head, rest) = input.split_at(len as usize);
    *input = rest;
    Ok(String::from_utf8_lossy(head).into_owned())
}

/// Write one length-framed packet.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let mut frame = Vec::with_capacity(payload.len() + 5);
    put_varint(&mut frame, payload.len() as i32);
    frame.extend_from_slice(payload);
    writer.write_all(&frame)
}

/// Read one length-framed packet, returning the payload without its prefix.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = read_varint(reader)?;
    if len < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "negative frame length",
        ));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn varint_bytes(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint(&mut buf, value);
        buf
    }

    #[test]
    fn test_varint_encoding() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(127), vec![0x7f]);
        assert_eq!(varint_bytes(128), vec![0x80, 0x01]);
        assert_eq!(varint_bytes(25565), vec![0xdd, 0xc7, 0x01]);
        // -1 is the "auto-detect" protocol version in the handshake
        assert_eq!(varint_bytes(-1), vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn test_varint_round_trip() {
        for value in [0, 1, 127, 128, 300, 25565, i32::MAX, -1] {
            let bytes = varint_bytes(value);
            let mut slice = bytes.as_slice();
            assert_eq!(get_varint(&mut slice).unwrap(), value);
            assert!(slice.is_empty());

            let mut cursor = Cursor::new(bytes);
            assert_eq!(read_varint(&mut cursor).unwrap(), value);
        }
    }

    #[test]
    fn test_varint_rejects_garbage() {
        let mut truncated: &[u8] = &[0x80];
        assert!(get_varint(&mut truncated).is_err());
        let mut overlong: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(get_varint(&mut overlong).is_err());
    }

    #[test]
    fn test_string_round_trip() {
        let mut buf = Vec::new();
        put_string(&mut buf, "mc.example.com");
        let mut slice = buf.as_slice();
        assert_eq!(get_string(&mut slice).unwrap(), "mc.example.com");

        let mut short: &[u8] = &[0x05, b'a', b'b'];
        assert!(get_string(&mut short).is_err());
    }

    #[test]
    fn test_frame_round_trip() {
        let mut wire = Vec::new();
        write_frame(&mut wire, &[0x00, 0x01, 0x02]).unwrap();
        assert_eq!(wire, vec![0x03, 0x00, 0x01, 0x02]);

        let mut cursor = Cursor::new(wire);
        assert_eq!(read_frame(&mut cursor).unwrap(), vec![0x00, 0x01, 0x02]);
    }
}
