//! Random laptops and filters for demos and tests.

use rand::Rng;
use uuid::Builder;

use crate::catalog_proto::memory::Unit;
use crate::catalog_proto::screen::Panel;
use crate::catalog_proto::storage::Driver;
use crate::catalog_proto::{Cpu, Filter, Laptop, Memory, Screen, Storage};

const BRANDS: [&str; 3] = ["Apple", "Dell", "Lenovo"];
const APPLE_MODELS: [&str; 3] = ["Macbook Air", "Macbook Pro", "Macbook Pro 16"];
const DELL_MODELS: [&str; 3] = ["Latitude", "Vostro", "XPS"];
const LENOVO_MODELS: [&str; 3] = ["Thinkpad X1", "Thinkpad P1", "Thinkpad P53"];

const INTEL_CPUS: [&str; 4] = ["Xeon E-2286M", "Core i9-9980HK", "Core i7-9750H", "Core i5-9400F"];
const AMD_CPUS: [&str; 4] = [
    "Ryzen 7 PRO 2700U",
    "Ryzen 5 PRO 3500U",
    "Ryzen 3 PRO 3200GE",
    "Ryzen 9 5900HX",
];

const SCREEN_SIZES: [(u32, u32); 3] = [(1920, 1080), (2560, 1440), (3840, 2160)];

/// A random laptop with a fresh UUID v4 id.
pub fn new_laptop() -> Laptop {
    new_laptop_with(&mut rand::rng())
}

/// A random laptop drawn from `rng`, so a seeded generator yields a reproducible catalog.
pub fn new_laptop_with<R: Rng + ?Sized>(rng: &mut R) -> Laptop {
    let brand = pick(rng, &BRANDS);
    let name = match brand {
        "Apple" => pick(rng, &APPLE_MODELS),
        "Dell" => pick(rng, &DELL_MODELS),
        _ => pick(rng, &LENOVO_MODELS),
    };

    Laptop {
        id: Builder::from_random_bytes(rng.random()).into_uuid().to_string(),
        brand: brand.to_string(),
        name: name.to_string(),
        cpu: Some(new_cpu(rng)),
        ram: Some(Memory {
            value: rng.random_range(4..=64),
            unit: Unit::Gigabyte.into(),
        }),
        storages: vec![
            Storage {
                driver: Driver::Ssd.into(),
                memory: Some(Memory {
                    value: rng.random_range(128..=1024),
                    unit: Unit::Gigabyte.into(),
                }),
            },
            Storage {
                driver: Driver::Hdd.into(),
                memory: Some(Memory {
                    value: rng.random_range(1..=6),
                    unit: Unit::Terabyte.into(),
                }),
            },
        ],
        screen: Some(new_screen(rng)),
        weight_kg: rng.random_range(1.0..3.0),
        price_usd: rng.random_range(1500.0..3500.0),
        release_year: rng.random_range(2015..=2019),
    }
}

/// A random search filter.
pub fn new_filter() -> Filter {
    new_filter_with(&mut rand::rng())
}

pub fn new_filter_with<R: Rng + ?Sized>(rng: &mut R) -> Filter {
    Filter {
        max_price_usd: rng.random_range(1500.0..3500.0),
        min_cpu_cores: rng.random_range(2..=8),
        min_cpu_ghz: rng.random_range(2.0..3.5),
        min_ram: Some(Memory {
            value: rng.random_range(4..=64),
            unit: Unit::Gigabyte.into(),
        }),
    }
}

fn new_cpu<R: Rng + ?Sized>(rng: &mut R) -> Cpu {
    let (brand, name) = if rng.random_bool(0.5) {
        ("Intel", pick(rng, &INTEL_CPUS))
    } else {
        ("AMD", pick(rng, &AMD_CPUS))
    };

    let number_cores = rng.random_range(2..=8);
    let min_ghz = rng.random_range(2.0..3.5);

    Cpu {
        brand: brand.to_string(),
        name: name.to_string(),
        number_cores,
        number_threads: rng.random_range(number_cores..=12),
        min_ghz,
        max_ghz: rng.random_range(min_ghz..=5.0),
    }
}

fn new_screen<R: Rng + ?Sized>(rng: &mut R) -> Screen {
    let (resolution_width, resolution_height) =
        SCREEN_SIZES[rng.random_range(0..SCREEN_SIZES.len())];
    Screen {
        size_inch: rng.random_range(13.0..17.0),
        resolution_width,
        resolution_height,
        panel: if rng.random_bool(0.5) { Panel::Ips } else { Panel::Oled }.into(),
        multitouch: rng.random_bool(0.5),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options[rng.random_range(0..options.len())]
}
