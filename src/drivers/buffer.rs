/// Growing byte buffer fed by raw serial reads.
///
/// There is no upper bound: a transmitter that never emits enough delimiters
/// makes it grow forever. The framing this crate targets keeps records short.
#[derive(Debug, Default, Clone)]
pub struct LineAccumulator {
    data: Vec<u8>,
}
impl LineAccumulator {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn clear(&mut self) {
        self.data.clear();
    }
    /// Printable rendering for debug logs.
    pub fn escaped(&self) -> String {
        escape_bytes(&self.data)
    }
}
/// Escapes CR/LF and non-printable bytes so log lines stay on one line.
pub fn escape_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|&byte| match byte {
            b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
            b'\r' => "\\r".to_string(),
            b'\n' => "\\n".to_string(),
            _ => format!("\\x{:02X}", byte),
        })
        .collect()
}
