//! Per-channel DSD to PCM low-pass filter
//!
//! A symmetric 96-tap FIR low-pass over the 1-bit stream. The 96-bit window
//! is split into 12 bytes and every byte is looked up in a precomputed
//! table holding the partial sum of its 8 taps, so one output costs 12
//! table lookups.

use std::sync::OnceLock;

/// Number of FIR constants in one half of the filter
const HALF_TAPS: usize = 48;

/// Bytes of bit history covered by the full filter
const TABLES: usize = 2 * HALF_TAPS / 8;

/// Must be a power of two larger than `TABLES`
const FIFO_SIZE: usize = 16;
const FIFO_MASK: usize = FIFO_SIZE - 1;

/// Idle pattern: its energy sits at 352.8 kHz and 1.0584 MHz, which the
/// filter removes completely
pub const SILENCE: u8 = 0x69;

/// Right half of the impulse response, from the centre outwards
#[rustfmt::skip]
const HTAPS: [f64; HALF_TAPS] = [
     0.09950731974056658,
     0.09562845727714668,
     0.08819647126516944,
     0.07782552527068175,
     0.06534876523171299,
     0.05172629311427257,
     0.0379429484910187,
     0.02490921351762261,
     0.0133774746265897,
     0.003883043418804416,
    -0.003284703416210726,
    -0.008080250212687497,
    -0.01067241812471033,
    -0.01139427235000863,
    -0.0106813877974587,
    -0.009007905078766049,
    -0.006828859761015335,
    -0.004535184322001496,
    -0.002425035959059578,
    -0.0006922187080790708,
     0.0005700762133516592,
     0.001353838005269448,
     0.001713709169690937,
     0.001742046839472948,
     0.001545601648013235,
     0.001226696225277855,
     0.0008704322683580222,
     0.0005381636200535649,
     0.000266446345425276,
     7.002968738383528e-05,
    -5.279407053811266e-05,
    -0.0001140625650874684,
    -0.0001304796361231895,
    -0.0001189970287491285,
    -9.396247155265073e-05,
    -6.577634378272832e-05,
    -4.07492895872535e-05,
    -2.17407957554587e-05,
    -9.163058931391722e-06,
    -2.017460145032201e-06,
     1.249721855219005e-06,
     2.166655190537392e-06,
     1.930520892991082e-06,
     1.319400334374195e-06,
     7.410039764949091e-07,
     3.423230509967409e-07,
     1.244182214744588e-07,
     3.130441005359396e-08,
];

type Tables = [[f32; 256]; TABLES];

/// Tap `n` of the full filter, oldest bit first
fn tap(n: usize) -> f64 {
    if n < HALF_TAPS {
        HTAPS[HALF_TAPS - 1 - n]
    } else {
        HTAPS[n - HALF_TAPS]
    }
}

/// `tables()[k][byte]`: contribution of window byte `k` (oldest first),
/// MSB being the earliest bit
fn tables() -> &'static Tables {
    static TABLES_CELL: OnceLock<Box<Tables>> = OnceLock::new();

    TABLES_CELL.get_or_init(|| {
        let mut tables = Box::new([[0.0f32; 256]; TABLES]);

        for (k, table) in tables.iter_mut().enumerate() {
            for (byte, entry) in table.iter_mut().enumerate() {
                let acc: f64 = (0..8)
                    .map(|m| {
                        let bit = (byte >> (7 - m)) & 1;
                        let sign = if bit == 1 { 1.0 } else { -1.0 };
                        sign * tap(k * 8 + m)
                    })
                    .sum();
                *entry = acc as f32;
            }
        }

        tables
    })
}

/// Filter state for one DSD channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsd2Pcm {
    /// Past bytes, MSB-first bit order
    fifo: [u8; FIFO_SIZE],

    /// Slot the next byte goes into
    pos: usize,
}

impl Dsd2Pcm {
    pub fn new() -> Self {
        Self {
            fifo: [SILENCE; FIFO_SIZE],
            pos: 0,
        }
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.fifo = [SILENCE; FIFO_SIZE];
        self.pos = 0;
    }

    /// History byte `age` steps back from the newest one
    #[inline(always)]
    fn byte(&self, age: usize) -> u8 {
        self.fifo[(self.pos.wrapping_sub(1 + age)) & FIFO_MASK]
    }

    #[inline]
    fn push(&mut self, byte: u8, lsb_first: bool) {
        self.fifo[self.pos] = if lsb_first { byte.reverse_bits() } else { byte };
        self.pos = (self.pos + 1) & FIFO_MASK;
    }

    /// Filter output with the window ending `shift` bits into the newest byte
    #[inline]
    fn evaluate(&self, tables: &Tables, shift: u32) -> f32 {
        let mut acc = 0.0f64;
        let mut older = self.byte(TABLES);

        for (k, table) in tables.iter().enumerate() {
            let newer = self.byte(TABLES - 1 - k);
            let pair = (u16::from(older) << 8) | u16::from(newer);
            acc += f64::from(table[usize::from((pair >> (8 - shift)) as u8)]);
            older = newer;
        }

        acc as f32
    }

    /// Feed one byte and produce one sample (8:1 decimation)
    pub fn translate_byte(&mut self, byte: u8, lsb_first: bool) -> f32 {
        self.push(byte, lsb_first);
        self.evaluate(tables(), 8)
    }

    /// Feed one byte and produce one sample per bit, in time order
    pub fn translate_bits(&mut self, byte: u8, lsb_first: bool, out: &mut [f32; 8]) {
        let tables = tables();
        self.push(byte, lsb_first);

        for (shift, sample) in (1..=8).zip(out.iter_mut()) {
            *sample = self.evaluate(tables, shift);
        }
    }
}

impl Default for Dsd2Pcm {
    fn default() -> Self {
        Self::new()
    }
}
