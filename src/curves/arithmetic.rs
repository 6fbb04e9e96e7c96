use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use super::params::CurveParams;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: BigUint,
    pub y: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine(AffinePoint),
}

/// Multiplicative inverse of `a` modulo `m` by the extended Euclidean algorithm
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a % m), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }
    (((old_s % &modulus) + &modulus) % &modulus).to_biguint()
}

/// Big endian bytes left padded to `len`. `None` if the value does not fit.
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let bytes = if value.is_zero() { Vec::new() } else { value.to_bytes_be() };
    if bytes.len() > len {
        return None;
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Some(out)
}

impl CurveParams {
    pub fn generator(&self) -> AffinePoint {
        AffinePoint { x: self.gx.clone(), y: self.gy.clone() }
    }

    fn sub_mod(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((a % &self.p) + &self.p - (b % &self.p)) % &self.p
    }

    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        if point.x >= self.p || point.y >= self.p {
            return false;
        }
        let lhs = (&point.y * &point.y) % &self.p;
        let rhs = (&point.x * &point.x * &point.x + &self.a * &point.x + &self.b) % &self.p;
        lhs == rhs
    }

    pub fn double(&self, point: &Point) -> Point {
        let pt = match point {
            Point::Infinity => return Point::Infinity,
            Point::Affine(pt) => pt,
        };
        if pt.y.is_zero() {
            return Point::Infinity;
        }

        let numerator = (BigUint::from(3u8) * &pt.x * &pt.x + &self.a) % &self.p;
        let denominator = match mod_inverse(&(BigUint::from(2u8) * &pt.y), &self.p) {
            Some(inv) => inv,
            None => return Point::Infinity,
        };
        let lambda = (numerator * denominator) % &self.p;
        self.finish(&lambda, pt, &pt.x)
    }

    pub fn add(&self, lhs: &Point, rhs: &Point) -> Point {
        let (p1, p2) = match (lhs, rhs) {
            (Point::Infinity, other) | (other, Point::Infinity) => return other.clone(),
            (Point::Affine(p1), Point::Affine(p2)) => (p1, p2),
        };

        if p1.x == p2.x {
            if ((&p1.y + &p2.y) % &self.p).is_zero() {
                return Point::Infinity;
            }
            return self.double(lhs);
        }

        let numerator = self.sub_mod(&p2.y, &p1.y);
        let denominator = match mod_inverse(&self.sub_mod(&p2.x, &p1.x), &self.p) {
            Some(inv) => inv,
            None => return Point::Infinity,
        };
        let lambda = (numerator * denominator) % &self.p;
        self.finish(&lambda, p1, &p2.x)
    }

    /* x3 = l^2 - x1 - x2, y3 = l(x1 - x3) - y1 */
    fn finish(&self, lambda: &BigUint, p1: &AffinePoint, x2: &BigUint) -> Point {
        let x3 = self.sub_mod(&self.sub_mod(&(lambda * lambda), &p1.x), x2);
        let y3 = self.sub_mod(&((lambda * self.sub_mod(&p1.x, &x3)) % &self.p), &p1.y);
        Point::Affine(AffinePoint { x: x3, y: y3 })
    }

    /// Left-to-right double and add
    pub fn multiply(&self, scalar: &BigUint, point: &AffinePoint) -> Point {
        let base = Point::Affine(point.clone());
        let mut result = Point::Infinity;
        for byte in scalar.to_bytes_be() {
            for bit in (0..8).rev() {
                result = self.double(&result);
                if (byte >> bit) & 1 == 1 {
                    result = self.add(&result, &base);
                }
            }
        }
        result
    }

    /// Leftmost `n.bits()` bits of the digest as an integer
    pub fn digest_to_scalar(&self, digest: &[u8]) -> BigUint {
        let e = BigUint::from_bytes_be(digest);
        let digest_bits = digest.len() as u64 * 8;
        let order_bits = self.n.bits();
        if digest_bits > order_bits {
            return e >> (digest_bits - order_bits);
        }
        e
    }

    pub fn verify_scalar(&self, e: &BigUint, r: &BigUint, s: &BigUint, key: &AffinePoint) -> bool {
        if r.is_zero() || s.is_zero() || r >= &self.n || s >= &self.n {
            return false;
        }
        if !self.is_on_curve(key) {
            return false;
        }

        let w = match mod_inverse(s, &self.n) {
            Some(w) => w,
            None => return false,
        };
        let u1 = (e * &w) % &self.n;
        let u2 = (r * &w) % &self.n;
        let sum = self.add(&self.multiply(&u1, &self.generator()), &self.multiply(&u2, key));

        match sum {
            Point::Infinity => false,
            Point::Affine(pt) => &(pt.x % &self.n) == r,
        }
    }

    /// Plain ECDSA signing with a caller supplied nonce `k`
    pub fn sign_scalar(&self, e: &BigUint, d: &BigUint, k: &BigUint) -> Option<(BigUint, BigUint)> {
        let r = match self.multiply(k, &self.generator()) {
            Point::Infinity => return None,
            Point::Affine(pt) => pt.x % &self.n,
        };
        if r.is_zero() {
            return None;
        }
        let k_inv = mod_inverse(k, &self.n)?;
        let s = (k_inv * ((e + &r * d) % &self.n)) % &self.n;
        if s.is_zero() {
            return None;
        }
        Some((r, s))
    }
}
