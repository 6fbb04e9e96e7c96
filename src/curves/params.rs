use lazy_static::lazy_static;
use num_bigint::BigUint;

/// Short Weierstrass curve y^2 = x^3 + ax + b over GF(p) with base point G of order n
#[derive(Debug)]
pub struct CurveParams {
    pub name: &'static str,
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    pub n: BigUint,
    pub field_bytes: usize,
    pub scalar_bytes: usize,
}

fn int(hex_value: &str) -> BigUint {
    /* literals below are checked by test_generator_has_order_n */
    BigUint::parse_bytes(hex_value.as_bytes(), 16).unwrap_or_default()
}

impl CurveParams {
    fn from_hex(name: &'static str, p: &str, a: &str, b: &str, gx: &str, gy: &str, n: &str) -> Self {
        let p = int(p);
        let n = int(n);
        let field_bytes = ((p.bits() + 7) / 8) as usize;
        let scalar_bytes = ((n.bits() + 7) / 8) as usize;
        CurveParams {
            name,
            p,
            a: int(a),
            b: int(b),
            gx: int(gx),
            gy: int(gy),
            n,
            field_bytes,
            scalar_bytes,
        }
    }
}

lazy_static! {
    pub static ref SECP192R1: CurveParams = CurveParams::from_hex(
        "secp192r1",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFC",
        "64210519E59C80E70FA7E9AB72243049FEB8DEECC146B9B1",
        "188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012",
        "07192B95FFC8DA78631011ED6B24CDD573F977A11E794811",
        "FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831",
    );
    pub static ref SECP224K1: CurveParams = CurveParams::from_hex(
        "secp224k1",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFE56D",
        "00",
        "05",
        "A1455B334DF099DF30FC28A169A467E9E47075A90F7E650EB6B7A45C",
        "7E089FED7FBA344282CAFBD6F7E319F7C0B0BD59E2CA4BDB556D61A5",
        "010000000000000000000000000001DCE8D2EC6184CAF0A971769FB1F7",
    );
    pub static ref SECP256R1: CurveParams = CurveParams::from_hex(
        "secp256r1",
        "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF",
        "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFC",
        "5AC635D8AA3A93E7B3EBBD55769886BC651D06B0CC53B0F63BCE3C3E27D2604B",
        "6B17D1F2E12C4247F8BCE6E563A440F277037D812DEB33A0F4A13945D898C296",
        "4FE342E2FE1A7F9B8EE7EB4A7C0F9E162BCE33576B315ECECBB6406837BF51F5",
        "FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
    );
    pub static ref SECP384R1: CurveParams = CurveParams::from_hex(
        "secp384r1",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFF",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFC",
        "B3312FA7E23EE7E4988E056BE3F82D19181D9C6EFE8141120314088F5013875AC656398D8A2ED19D2A85C8EDD3EC2AEF",
        "AA87CA22BE8B05378EB1C71EF320AD746E1D3B628BA79B9859F741E082542A385502F25DBF55296C3A545E3872760AB7",
        "3617DE4A96262C6F5D9E98BF9292DC29F8F41DBD289A147CE9DA3113B5F0B8C00A60B1CE1D7E819D7A431D7C90EA0E5F",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC7634D81F4372DDF581A0DB248B0A77AECEC196ACCC52973",
    );
    pub static ref SECP521R1: CurveParams = CurveParams::from_hex(
        "secp521r1",
        "01FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
        "01FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC",
        "0051953EB9618E1C9A1F929A21A0B68540EEA2DA725B99B315F3B8B489918EF109E156193951EC7E937B1652C0BD3BB1BF073573DF883D2C34F1EF451FD46B503F00",
        "00C6858E06B70404E9CD9E3ECB662395B4429C648139053FB521F828AF606B4D3DBAA14B5E77EFE75928FE1DC127A2FFA8DE3348B3C1856A429BF97E7E31C2E5BD66",
        "011839296A789A3BC0045C8A5FB42C7D1BD998F54449579B446817AFBD17273E662C97EE72995EF42640C550B9013FAD0761353C7086A272C24088BE94769FD16650",
        "01FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFA51868783BF2F966B7FCC0148F709A5D03BB5C9B8899C47AEBB6FB71E91386409",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{AffinePoint, Point};

    #[test]
    fn test_generator_has_order_n() {
        for params in [&*SECP192R1, &*SECP224K1, &*SECP256R1, &*SECP384R1, &*SECP521R1] {
            let g = params.generator();
            assert!(params.is_on_curve(&g), "{}", params.name);
            assert_eq!(params.multiply(&params.n, &g), Point::Infinity, "{}", params.name);
        }
    }

    #[test]
    fn test_sizes() {
        assert_eq!(SECP192R1.field_bytes, 24);
        assert_eq!(SECP224K1.field_bytes, 28);
        assert_eq!(SECP224K1.n.bits(), 225);
        assert_eq!(SECP256R1.scalar_bytes, 32);
        assert_eq!(SECP384R1.field_bytes, 48);
        assert_eq!(SECP521R1.field_bytes, 66);
    }

    #[test]
    fn test_point_off_curve() {
        let bogus = AffinePoint { x: BigUint::from(1u8), y: BigUint::from(1u8) };
        assert!(!SECP256R1.is_on_curve(&bogus));
    }
}
