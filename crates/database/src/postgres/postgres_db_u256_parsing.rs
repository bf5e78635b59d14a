use alloy_primitives::U256;
use bytes::BufMut;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

/// U256 carried through a postgres `NUMERIC` column in the binary wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostgresNumeric(pub U256);

impl From<U256> for PostgresNumeric {
    fn from(value: U256) -> Self {
        PostgresNumeric(value)
    }
}

impl From<PostgresNumeric> for U256 {
    fn from(value: PostgresNumeric) -> Self {
        value.0
    }
}

const NBASE: u64 = 10000;

fn read_u16(raw: &[u8], offset: &mut usize) -> Result<u16, std::io::Error> {
    let bytes = raw.get(*offset..*offset + 2).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "numeric too short")
    })?;
    *offset += 2;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Postgres may drop trailing zero groups when storing, e.g. 10^27 comes back as
/// [0, 1, 0, 6, 0, 0, 0, 0, 3, 232], so the weight is used to scale the groups back up.
/// Sign and dscale are ignored, fractional groups are truncated.
impl<'a> FromSql<'a> for PostgresNumeric {
    fn from_sql(_: &Type, raw: &[u8]) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let mut offset = 0;
        let num_groups = read_u16(raw, &mut offset)? as i32;
        let weight = read_u16(raw, &mut offset)? as i16 as i32;
        // sign and dscale
        offset += 4;

        let base = U256::from(NBASE);
        let integer_groups = (weight + 1).max(0);
        let mut value = U256::ZERO;
        for _ in 0..num_groups.min(integer_groups) {
            value = value * base + U256::from(read_u16(raw, &mut offset)?);
        }

        let missing_groups = integer_groups.saturating_sub(num_groups).max(0);
        value *= base.pow(U256::from(missing_groups));

        Ok(PostgresNumeric(value))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::NUMERIC)
    }
}

/// Writes positive integers only: scale 0, one group per base 10000 digit.
/// 32 groups cover U256::MAX.
impl ToSql for PostgresNumeric {
    fn to_sql(
        &self,
        _: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        const MAX_GROUP_COUNT: usize = 32;
        let divisor = U256::from(NBASE);
        let mut temp = self.0;
        let mut digits = [0i16; MAX_GROUP_COUNT];
        let mut num_digits = 0;

        while temp != U256::ZERO {
            let (quotient, remainder) = temp.div_rem(divisor);
            digits[num_digits] = remainder.as_limbs()[0] as i16;
            num_digits += 1;
            temp = quotient;
        }

        if num_digits == 0 {
            num_digits = 1;
        }
        let weight = (num_digits as i16).saturating_sub(1);

        out.reserve(8 + num_digits * 2);
        out.put_u16(num_digits as u16);
        out.put_i16(weight);
        // sign, positive
        out.put_u16(0x0000);
        // dscale
        out.put_u16(0);

        for digit in digits.iter().take(num_digits).rev() {
            out.put_i16(*digit);
        }

        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::NUMERIC)
    }

    tokio_postgres::types::to_sql_checked!();
}
