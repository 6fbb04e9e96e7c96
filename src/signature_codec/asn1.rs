use super::CodecError;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_SEQUENCE: u8 = 0x30;

/// Minimal DER reader, definite lengths only
pub struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        DerReader { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn byte(&mut self) -> Result<u8, CodecError> {
        let b = *self.data.get(self.pos).ok_or(CodecError::InvalidDer("unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(b)
    }

    fn length(&mut self) -> Result<usize, CodecError> {
        let first = self.byte()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        if count == 0 || count > 4 {
            return Err(CodecError::InvalidDer(format!("unsupported length form {first:#04x}")));
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.byte()? as usize;
        }
        Ok(len)
    }

    /// Read one element, returning its tag and content
    pub fn read_tlv(&mut self) -> Result<(u8, &'a [u8]), CodecError> {
        let tag = self.byte()?;
        let len = self.length()?;
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len())
            .ok_or(CodecError::InvalidDer(format!("element of {len} bytes exceeds input")))?;
        let content = &self.data[self.pos..end];
        self.pos = end;
        Ok((tag, content))
    }

    pub fn expect(&mut self, tag: u8) -> Result<&'a [u8], CodecError> {
        let (actual, content) = self.read_tlv()?;
        if actual != tag {
            return Err(CodecError::InvalidDer(format!("expected tag {tag:#04x}, found {actual:#04x}")));
        }
        Ok(content)
    }
}

pub fn write_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes: Vec<u8> = len.to_be_bytes().iter().copied().skip_while(|b| *b == 0).collect();
        out.push(0x80 | bytes.len() as u8);
        out.extend_from_slice(&bytes);
    }
    out.extend_from_slice(content);
    out
}

/// Unsigned big endian magnitude as a DER INTEGER
pub fn write_unsigned_integer(magnitude: &[u8]) -> Vec<u8> {
    let trimmed: Vec<u8> = magnitude.iter().copied().skip_while(|b| *b == 0).collect();
    let mut content = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.is_empty() || trimmed[0] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(&trimmed);
    write_tlv(TAG_INTEGER, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_form_length() {
        let content = vec![0xaa; 200];
        let encoded = write_tlv(TAG_SEQUENCE, &content);
        assert_eq!(&encoded[..3], &[0x30, 0x81, 200]);
        let mut reader = DerReader::new(&encoded);
        assert_eq!(reader.expect(TAG_SEQUENCE).unwrap().len(), 200);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_unsigned_integer() {
        assert_eq!(write_unsigned_integer(&[0x00, 0x7f]), vec![0x02, 0x01, 0x7f]);
        assert_eq!(write_unsigned_integer(&[0x80]), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(write_unsigned_integer(&[]), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = DerReader::new(&[0x30, 0x05, 0x02, 0x01]);
        assert!(reader.read_tlv().is_err());
        let mut reader = DerReader::new(&[0x02, 0x01, 0x01]);
        assert!(reader.expect(TAG_SEQUENCE).is_err());
    }
}
