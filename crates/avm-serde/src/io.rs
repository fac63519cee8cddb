use crate::StateError;

pub trait StateEncode {
    fn encode_state(&self, out: &mut Vec<u8>);
}

pub trait StateDecode: Sized {
    fn decode_state(input: &mut &[u8]) -> Result<Self, StateError>;
}

/// Encode a value into a fresh buffer.
pub fn encode_to_vec<T: StateEncode + ?Sized>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    value.encode_state(&mut out);
    out
}

/// Decode a value that must consume the whole input.
pub fn decode_exact<T: StateDecode>(bytes: &[u8]) -> Result<T, StateError> {
    let mut input = bytes;
    let value = T::decode_state(&mut input)?;
    if !input.is_empty() {
        return Err(StateError::TrailingBytes(input.len()));
    }
    Ok(value)
}

// Primitive helpers. All integers are little-endian.

pub fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

pub fn put_bool(out: &mut Vec<u8>, v: bool) {
    out.push(v as u8);
}

pub fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u128(out: &mut Vec<u8>, v: u128) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
}

/// Length-prefixed (u32) byte string.
pub fn put_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, len_to_u32(bytes.len()));
    out.extend_from_slice(bytes);
}

pub fn get_u8(input: &mut &[u8]) -> Result<u8, StateError> {
    if input.is_empty() {
        return Err(StateError::UnexpectedEof);
    }
    let (b, rest) = input.split_at(1);
    *input = rest;
    Ok(b[0])
}

pub fn get_bool(input: &mut &[u8]) -> Result<bool, StateError> {
    match get_u8(input)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(StateError::InvalidValue("invalid bool")),
    }
}

pub fn get_u16(input: &mut &[u8]) -> Result<u16, StateError> {
    let b = get_array::<2>(input)?;
    Ok(u16::from_le_bytes(b))
}

pub fn get_u32(input: &mut &[u8]) -> Result<u32, StateError> {
    let b = get_array::<4>(input)?;
    Ok(u32::from_le_bytes(b))
}

pub fn get_u64(input: &mut &[u8]) -> Result<u64, StateError> {
    let b = get_array::<8>(input)?;
    Ok(u64::from_le_bytes(b))
}

pub fn get_i64(input: &mut &[u8]) -> Result<i64, StateError> {
    let b = get_array::<8>(input)?;
    Ok(i64::from_le_bytes(b))
}

pub fn get_u128(input: &mut &[u8]) -> Result<u128, StateError> {
    let b = get_array::<16>(input)?;
    Ok(u128::from_le_bytes(b))
}

pub fn get_bytes<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], StateError> {
    if input.len() < len {
        return Err(StateError::UnexpectedEof);
    }
    let (b, rest) = input.split_at(len);
    *input = rest;
    Ok(b)
}

pub fn get_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N], StateError> {
    let b = get_bytes(input, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(b);
    Ok(out)
}

pub fn get_var_bytes(input: &mut &[u8]) -> Result<Vec<u8>, StateError> {
    let len = get_u32(input)? as usize;
    Ok(get_bytes(input, len)?.to_vec())
}

/// Convert a usize length to u32, panicking on overflow.
/// Lengths come from in-memory values, so overflow is a programming error.
pub fn len_to_u32(len: usize) -> u32 {
    assert!(
        len <= u32::MAX as usize,
        "state length {} exceeds u32::MAX; this is a programming error",
        len
    );
    len as u32
}

// Length-prefixed sequences.

pub fn put_vec<T: StateEncode>(out: &mut Vec<u8>, items: &[T]) {
    put_u32(out, len_to_u32(items.len()));
    for item in items {
        item.encode_state(out);
    }
}

pub fn get_vec<T: StateDecode>(input: &mut &[u8]) -> Result<Vec<T>, StateError> {
    let len = get_u32(input)? as usize;
    // Every element takes at least one byte.
    if len > input.len() {
        return Err(StateError::LengthOverflow);
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(T::decode_state(input)?);
    }
    Ok(items)
}
