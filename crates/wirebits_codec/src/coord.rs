//! # Spatial Codecs
//!
//! Lossy fixed-point encodings for world coordinates, angles and unit
//! normals, built on the primitive bit operations.
//!
//! ## Coordinate layout
//!
//! ```text
//! general:  [has_int][has_frac]([sign][int-1: 14][frac: 12])
//! mp:       [in_bounds][has_int][sign][int-1: 11|14][frac: 3|12]
//! integral: [in_bounds][has_int]([sign][int-1: 11|14])
//! ```
//!
//! Zero costs two bits in the general form. Integer parts are stored minus
//! one because zero is already covered by the flag. Values whose integer part
//! exceeds the field width wrap; callers keep coordinates inside the world.

use wirebits_shared::{
    Angles, Vec3, COORD_DENOMINATOR, COORD_DENOMINATOR_LOWPRECISION, COORD_FRACTIONAL_BITS,
    COORD_FRACTIONAL_BITS_MP_LOWPRECISION, COORD_INTEGER_BITS, COORD_INTEGER_BITS_MP,
    COORD_RESOLUTION, COORD_RESOLUTION_LOWPRECISION, NORMAL_DENOMINATOR, NORMAL_FRACTIONAL_BITS,
    NORMAL_RESOLUTION,
};

use crate::masks::WORD_BITS;
use crate::reader::BitReader;
use crate::writer::BitWriter;

/// Precision of the multiplayer coordinate encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CoordPrecision {
    /// Whole units only; no fraction bits.
    Integral,
    /// 1/8 unit fraction.
    LowPrecision,
    /// 1/4096 unit fraction.
    #[default]
    Full,
}

impl CoordPrecision {
    /// Fraction bits written for this precision.
    #[inline]
    #[must_use]
    pub const fn fraction_bits(self) -> u32 {
        match self {
            Self::Integral => 0,
            Self::LowPrecision => COORD_FRACTIONAL_BITS_MP_LOWPRECISION,
            Self::Full => COORD_FRACTIONAL_BITS,
        }
    }

    /// Fraction denominator (1 for integral).
    #[inline]
    #[must_use]
    pub const fn denominator(self) -> u32 {
        match self {
            Self::Integral => 1,
            Self::LowPrecision => COORD_DENOMINATOR_LOWPRECISION,
            Self::Full => COORD_DENOMINATOR,
        }
    }

    /// Smallest representable step. Also the threshold below which a
    /// negative value encodes without its sign.
    #[inline]
    #[must_use]
    pub const fn resolution(self) -> f32 {
        match self {
            Self::LowPrecision => COORD_RESOLUTION_LOWPRECISION,
            Self::Integral | Self::Full => COORD_RESOLUTION,
        }
    }
}

/// `|value * denominator|` truncated, keeping the fraction bits only.
#[inline]
fn fraction_of(value: f32, denominator: u32) -> u32 {
    ((value * denominator as f32) as i32).unsigned_abs() & (denominator - 1)
}

#[inline]
fn mp_integer_bits(in_bounds: bool) -> u32 {
    if in_bounds {
        COORD_INTEGER_BITS_MP
    } else {
        COORD_INTEGER_BITS
    }
}

#[inline]
fn apply_sign(value: f32, negative: bool) -> f32 {
    if negative {
        -value
    } else {
        value
    }
}

// =============================================================================
// Writer
// =============================================================================

impl BitWriter<'_> {
    /// Writes a world coordinate with 1/4096 resolution.
    pub fn write_coord(&mut self, value: f32) {
        let negative = value <= -COORD_RESOLUTION;
        let int_val = value.abs() as u32;
        let fract_val = fraction_of(value, COORD_DENOMINATOR);

        self.write_one_bit(int_val != 0);
        self.write_one_bit(fract_val != 0);

        if int_val != 0 || fract_val != 0 {
            self.write_one_bit(negative);
            if int_val != 0 {
                self.write_unsigned(int_val - 1, COORD_INTEGER_BITS);
            }
            if fract_val != 0 {
                self.write_unsigned(fract_val, COORD_FRACTIONAL_BITS);
            }
        }
    }

    /// Writes a coordinate in the multiplayer encoding.
    ///
    /// Integer parts below 2048 use 11 bits, others 14.
    pub fn write_coord_mp(&mut self, value: f32, precision: CoordPrecision) {
        let negative = value <= -precision.resolution();
        let int_val = value.abs() as u32;
        let in_bounds = int_val < (1 << COORD_INTEGER_BITS_MP);
        let int_bits = mp_integer_bits(in_bounds);

        self.write_one_bit(in_bounds);
        self.write_one_bit(int_val != 0);

        if precision == CoordPrecision::Integral {
            if int_val != 0 {
                self.write_one_bit(negative);
                self.write_unsigned(int_val - 1, int_bits);
            }
            return;
        }

        self.write_one_bit(negative);
        if int_val != 0 {
            self.write_unsigned(int_val - 1, int_bits);
        }
        self.write_unsigned(
            fraction_of(value, precision.denominator()),
            precision.fraction_bits(),
        );
    }

    /// Writes an angle in degrees as a `num_bits` fraction of a full turn.
    ///
    /// Angles outside `[0, 360)` wrap.
    pub fn write_angle(&mut self, degrees: f32, num_bits: u32) {
        debug_assert!((1..=WORD_BITS).contains(&num_bits), "write_angle: {num_bits} bits");
        let num_bits = num_bits.clamp(1, WORD_BITS);
        let steps = 1u64 << num_bits;
        let turns = ((f64::from(degrees) / 360.0) * steps as f64) as i64;
        self.write_unsigned((turns as u64 & (steps - 1)) as u32, num_bits);
    }

    /// Writes a normal component in `[-1, 1]`: sign bit plus 11-bit magnitude.
    pub fn write_normal(&mut self, value: f32) {
        let negative = value <= -NORMAL_RESOLUTION;
        let fract_val = ((value * NORMAL_DENOMINATOR as f32) as i32)
            .unsigned_abs()
            .min(NORMAL_DENOMINATOR);

        self.write_one_bit(negative);
        self.write_unsigned(fract_val, NORMAL_FRACTIONAL_BITS);
    }

    /// Writes three coordinates, each behind a presence flag.
    pub fn write_vec3_coord(&mut self, v: Vec3) {
        let present = v.to_array().map(|c| c.abs() >= COORD_RESOLUTION);

        for flag in present {
            self.write_one_bit(flag);
        }
        for (component, flag) in v.to_array().into_iter().zip(present) {
            if flag {
                self.write_coord(component);
            }
        }
    }

    /// Writes a unit vector: x and y as normals, z as a sign bit only.
    pub fn write_vec3_normal(&mut self, v: Vec3) {
        let has_x = v.x.abs() >= NORMAL_RESOLUTION;
        let has_y = v.y.abs() >= NORMAL_RESOLUTION;

        self.write_one_bit(has_x);
        self.write_one_bit(has_y);
        if has_x {
            self.write_normal(v.x);
        }
        if has_y {
            self.write_normal(v.y);
        }
        self.write_one_bit(v.z <= -NORMAL_RESOLUTION);
    }

    /// Writes pitch, yaw and roll in the vec3 coordinate layout.
    #[inline]
    pub fn write_angles(&mut self, angles: Angles) {
        self.write_vec3_coord(angles.to_vec3());
    }
}

// =============================================================================
// Reader
// =============================================================================

impl BitReader<'_> {
    /// Reads a coordinate written by [`BitWriter::write_coord`].
    pub fn read_coord(&mut self) -> f32 {
        let has_int = self.read_one_bit();
        let has_fract = self.read_one_bit();
        if !has_int && !has_fract {
            return 0.0;
        }

        let negative = self.read_one_bit();
        let int_val = if has_int {
            self.read_unsigned(COORD_INTEGER_BITS) + 1
        } else {
            0
        };
        let fract_val = if has_fract {
            self.read_unsigned(COORD_FRACTIONAL_BITS)
        } else {
            0
        };

        apply_sign(int_val as f32 + fract_val as f32 * COORD_RESOLUTION, negative)
    }

    /// Reads a coordinate written by [`BitWriter::write_coord_mp`] with the
    /// same precision.
    pub fn read_coord_mp(&mut self, precision: CoordPrecision) -> f32 {
        let int_bits = mp_integer_bits(self.read_one_bit());
        let has_int = self.read_one_bit();

        if precision == CoordPrecision::Integral {
            if !has_int {
                return 0.0;
            }
            let negative = self.read_one_bit();
            let int_val = self.read_unsigned(int_bits) + 1;
            return apply_sign(int_val as f32, negative);
        }

        let negative = self.read_one_bit();
        let int_val = if has_int {
            self.read_unsigned(int_bits) + 1
        } else {
            0
        };
        let fract_val = self.read_unsigned(precision.fraction_bits());

        apply_sign(
            int_val as f32 + fract_val as f32 * precision.resolution(),
            negative,
        )
    }

    /// Reads an angle written by [`BitWriter::write_angle`], in `[0, 360)`.
    pub fn read_angle(&mut self, num_bits: u32) -> f32 {
        let num_bits = num_bits.clamp(1, WORD_BITS);
        let steps = (1u64 << num_bits) as f64;
        let turns = self.read_unsigned(num_bits);
        (f64::from(turns) * (360.0 / steps)) as f32
    }

    /// Reads a normal component written by [`BitWriter::write_normal`].
    pub fn read_normal(&mut self) -> f32 {
        let negative = self.read_one_bit();
        let fract_val = self.read_unsigned(NORMAL_FRACTIONAL_BITS);
        apply_sign(fract_val as f32 * NORMAL_RESOLUTION, negative)
    }

    /// Reads a vector written by [`BitWriter::write_vec3_coord`].
    pub fn read_vec3_coord(&mut self) -> Vec3 {
        let present = [self.read_one_bit(), self.read_one_bit(), self.read_one_bit()];
        let [x, y, z] = present.map(|flag| if flag { self.read_coord() } else { 0.0 });
        Vec3::new(x, y, z)
    }

    /// Reads a unit vector written by [`BitWriter::write_vec3_normal`].
    ///
    /// z is rebuilt as `sqrt(1 - x² - y²)`, or 0 when x and y already fill
    /// the unit length.
    pub fn read_vec3_normal(&mut self) -> Vec3 {
        let has_x = self.read_one_bit();
        let has_y = self.read_one_bit();
        let x = if has_x { self.read_normal() } else { 0.0 };
        let y = if has_y { self.read_normal() } else { 0.0 };
        let negative_z = self.read_one_bit();

        let xy = x * x + y * y;
        let z = if xy < 1.0 { (1.0 - xy).sqrt() } else { 0.0 };

        Vec3::new(x, y, apply_sign(z, negative_z))
    }

    /// Reads angles written by [`BitWriter::write_angles`].
    #[inline]
    pub fn read_angles(&mut self) -> Angles {
        Angles::from_vec3(self.read_vec3_coord())
    }
}
