/// Append-only byte store backing a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub const INITIAL_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Appends `value` as four big-endian bytes.
    pub fn push_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
