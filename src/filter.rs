//! Matching laptops against a search [`Filter`].

use crate::catalog_proto::memory::Unit;
use crate::catalog_proto::{Filter, Laptop, Memory};

impl Memory {
    /// Size in bits, saturating on overflow. Memory with an unknown unit counts as zero.
    pub fn to_bits(&self) -> u64 {
        let shift = match self.unit() {
            Unit::Unknown => return 0,
            Unit::Bit => 0,
            Unit::Byte => 3,
            Unit::Kilobyte => 13,
            Unit::Megabyte => 23,
            Unit::Gigabyte => 33,
            Unit::Terabyte => 43,
        };
        self.value.saturating_mul(1u64 << shift)
    }
}

/// Whether `laptop` satisfies every constraint in `filter`.
///
/// A zero or absent constraint does not restrict the result.
pub fn matches(filter: &Filter, laptop: &Laptop) -> bool {
    if filter.max_price_usd > 0.0 && laptop.price_usd > filter.max_price_usd {
        return false;
    }

    let (cores, min_ghz) = laptop
        .cpu
        .as_ref()
        .map_or((0, 0.0), |cpu| (cpu.number_cores, cpu.min_ghz));
    if cores < filter.min_cpu_cores || min_ghz < filter.min_cpu_ghz {
        return false;
    }

    if let Some(min_ram) = &filter.min_ram {
        let ram_bits = laptop.ram.as_ref().map_or(0, Memory::to_bits);
        if ram_bits < min_ram.to_bits() {
            return false;
        }
    }

    true
}
