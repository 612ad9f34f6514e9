// rx-core/src/units.rs

use uom::si::f64::{
    MassDensity as UomMassDensity, MassRate as UomMassRate, Power as UomPower, Time as UomTime,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::power::kilowatt;
    use uom::si::time::second;

    #[test]
    fn power_conversion() {
        assert!((watts(1.5e6).get::<kilowatt>() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn residence_time_dimensions() {
        // rho * V / mdot comes out as a time.
        let tau: Time = kgpm3(1000.0) * m3(3.0) / kgps(40.0);
        assert!((tau.get::<second>() - 75.0).abs() < 1e-12);
    }
}
