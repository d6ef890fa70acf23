//! 14-bit parameter values
//!
//! RPN/NRPN parameters carry 14-bit values split over two 7-bit data entry
//! controllers. [`Value14`] keeps the MSB/LSB pair together with saturating
//! arithmetic for the data increment/decrement controllers;
//! [`ParameterBank`] is a fixed arena of enabled parameter numbers and their
//! current values, for tracking incoming parameter edits without a heap.

/// A 14-bit value stored as its two 7-bit wire bytes.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct Value14 {
    msb: u8,
    lsb: u8,
}

impl Value14 {
    pub const MAX: u16 = 0x3fff;

    pub const fn new(value: u16) -> Self {
        Value14 {
            msb: ((value >> 7) & 0x7f) as u8,
            lsb: (value & 0x7f) as u8,
        }
    }

    pub const fn from_bytes(msb: u8, lsb: u8) -> Self {
        Value14 {
            msb: msb & 0x7f,
            lsb: lsb & 0x7f,
        }
    }

    pub const fn as_14bits(self) -> u16 {
        (self.msb as u16) << 7 | self.lsb as u16
    }

    pub const fn msb(self) -> u8 {
        self.msb
    }

    pub const fn lsb(self) -> u8 {
        self.lsb
    }

    pub fn set_msb(&mut self, msb: u8) {
        self.msb = msb & 0x7f;
    }

    pub fn set_lsb(&mut self, lsb: u8) {
        self.lsb = lsb & 0x7f;
    }

    /// Add, sticking at [`Self::MAX`].
    pub fn saturating_add(&mut self, amount: u16) {
        let sum = u32::from(self.as_14bits()) + u32::from(amount);
        *self = Value14::new(if sum > u32::from(Self::MAX) {
            Self::MAX
        } else {
            sum as u16
        });
    }

    /// Subtract, sticking at 0.
    pub fn saturating_sub(&mut self, amount: u16) {
        *self = Value14::new(self.as_14bits().saturating_sub(amount));
    }
}

impl From<u16> for Value14 {
    fn from(value: u16) -> Self {
        Value14::new(value)
    }
}

#[derive(Clone, Copy)]
struct Cell {
    active: bool,
    number: u16,
    value: Value14,
}

/// Fixed-capacity store of parameter values, keyed by 14-bit parameter
/// number. At most `N` distinct numbers can be enabled at a time.
pub struct ParameterBank<const N: usize> {
    cells: [Cell; N],
}

impl<const N: usize> ParameterBank<N> {
    pub const fn new() -> Self {
        ParameterBank {
            cells: [Cell {
                active: false,
                number: 0,
                value: Value14::new(0),
            }; N],
        }
    }

    /// Start tracking `number` with a zero value. Returns false when the
    /// bank is full; re-enabling a tracked number is a no-op.
    pub fn enable(&mut self, number: u16) -> bool {
        if self.has(number) {
            return true;
        }
        for cell in self.cells.iter_mut() {
            if !cell.active {
                cell.active = true;
                cell.number = number;
                cell.value = Value14::new(0);
                return true;
            }
        }
        false
    }

    pub fn has(&self, number: u16) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.active && cell.number == number)
    }

    pub fn get(&self, number: u16) -> Option<&Value14> {
        self.cells
            .iter()
            .find(|cell| cell.active && cell.number == number)
            .map(|cell| &cell.value)
    }

    pub fn get_mut(&mut self, number: u16) -> Option<&mut Value14> {
        self.cells
            .iter_mut()
            .find(|cell| cell.active && cell.number == number)
            .map(|cell| &mut cell.value)
    }

    /// Forget every tracked parameter.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.active = false;
            cell.number = 0;
            cell.value = Value14::new(0);
        }
    }
}

impl<const N: usize> Default for ParameterBank<N> {
    fn default() -> Self {
        Self::new()
    }
}
