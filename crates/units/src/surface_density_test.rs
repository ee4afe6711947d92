mod tests {
    use approx::assert_relative_eq;

    use crate::surface_density::{SurfaceDensity, SurfaceDensityRate};
    use crate::time::Time;

    #[test]
    fn test_surface_density_conversions() {
        let sigma = SurfaceDensity::from_grams_per_cm2(100.0);
        assert_relative_eq!(sigma.to_kg_per_m2(), 1000.0);

        let sigma_kg = SurfaceDensity::from_kg_per_m2(1000.0);
        assert_relative_eq!(sigma_kg.to_grams_per_cm2(), 100.0);
    }

    #[test]
    fn test_surface_density_arithmetic() {
        let sigma1 = SurfaceDensity::from_kg_per_m2(1000.0);
        let sigma2 = SurfaceDensity::from_kg_per_m2(500.0);

        assert_relative_eq!((sigma1 + sigma2).to_kg_per_m2(), 1500.0);
        assert_relative_eq!((sigma1 - sigma2).to_kg_per_m2(), 500.0);
        assert_relative_eq!((sigma1 * 2.0).to_kg_per_m2(), 2000.0);
        assert_relative_eq!((sigma1 / 2.0).to_kg_per_m2(), 500.0);
    }

    #[test]
    fn test_rate_integrates_back_to_density() {
        let sigma = SurfaceDensity::from_kg_per_m2(12.0);
        let dt = Time::from_seconds(4.0);

        let rate = sigma / dt;
        assert_relative_eq!(rate.to_kg_per_m2_per_sec(), 3.0);
        assert_relative_eq!((rate * dt).to_kg_per_m2(), 12.0);

        let total = rate + SurfaceDensityRate::from_kg_per_m2_per_sec(1.0);
        assert_relative_eq!(total.to_kg_per_m2_per_sec(), 4.0);
    }

    #[test]
    fn test_rate_over_area() {
        let rate = SurfaceDensityRate::from_kg_per_m2_per_sec(2e-9);
        let mass_rate = rate.over_area(5e12);
        assert_relative_eq!(mass_rate.to_kg_per_sec(), 1e4);
    }
}
