//! Packed 4-bit arrays used for light data.

/// Two 4-bit values per byte; even indices use the low nibble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleArray {
    data: Vec<u8>,
}

impl NibbleArray {
    /// Array holding `len` nibbles, all zero. `len` is rounded up to even.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0; len.div_ceil(2)],
        }
    }

    /// Array holding `len` nibbles, all set to `value`.
    pub fn filled(len: usize, value: u8) -> Self {
        let value = value & 0x0F;
        Self {
            data: vec![value | (value << 4); len.div_ceil(2)],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    pub fn set(&mut self, index: usize, value: u8) {
        let value = value & 0x0F;
        let byte = &mut self.data[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    pub fn fill(&mut self, value: u8) {
        let value = value & 0x0F;
        self.data.fill(value | (value << 4));
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_neighbours_independent() {
        let mut arr = NibbleArray::new(4096);
        arr.set(10, 0xA);
        arr.set(11, 0x5);
        assert_eq!(arr.get(10), 0xA);
        assert_eq!(arr.get(11), 0x5);
        assert_eq!(arr.as_bytes()[5], 0x5A);
        assert_eq!(arr.get(12), 0);
    }

    #[test]
    fn values_are_masked() {
        let mut arr = NibbleArray::new(2);
        arr.set(0, 0xFF);
        assert_eq!(arr.get(0), 0x0F);
        assert_eq!(arr.get(1), 0);
    }

    #[test]
    fn filled_and_fill() {
        let mut arr = NibbleArray::filled(4096, 15);
        assert_eq!(arr.len(), 4096);
        assert!(arr.as_bytes().iter().all(|b| *b == 0xFF));
        arr.fill(3);
        assert_eq!(arr.get(4095), 3);
    }
}
