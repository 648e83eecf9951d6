use newtonbrot::{Complex, RootedPolynomial};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_point(rng: &mut StdRng) -> Complex {
    Complex::new(rng.gen_range(-3.0, 3.0), rng.gen_range(-3.0, 3.0))
}

#[test]
fn rooted_polynomials_vanish_at_their_roots() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let roots = [random_point(&mut rng), random_point(&mut rng)];
        let constant = random_point(&mut rng);
        let p = RootedPolynomial::new(constant, &roots);
        assert!(p.evaluate(roots[0]).module() < 1e-9);
        assert!(p.evaluate(roots[1]).module() < 1e-9);
        // The expansion is monic, and vanishes there too.
        let expanded = p.to_polynomial();
        assert!(expanded.evaluate(roots[0]).unwrap().module() < 1e-9);
        assert!(expanded.evaluate(roots[1]).unwrap().module() < 1e-9);
    }
}

#[test]
fn derivative_of_a_quadratic_at_the_midpoint() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..200 {
        let (r1, r2) = (random_point(&mut rng), random_point(&mut rng));
        let roots = [r1, r2];
        let derived = RootedPolynomial::new(Complex::ONE, &roots)
            .to_polynomial()
            .derive()
            .unwrap();
        let mid = Complex::new((r1.re + r2.re) / 2.0, (r1.im + r2.im) / 2.0);
        let expected = Complex::new(2.0, 0.0) * mid - (r1 + r2);
        assert!(derived.evaluate(mid).unwrap().distance(expected) < 1e-9);
    }
}

#[test]
fn roots_of_a_power_include_the_base() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let z = random_point(&mut rng);
        if z.module() < 1e-3 {
            continue;
        }
        let n = rng.gen_range(1, 9);
        let roots = z.power(n).unwrap().nth_roots(n).unwrap();
        assert_eq!(roots.len(), n as usize);
        let closest = roots
            .iter()
            .map(|r| r.distance(z))
            .fold(std::f64::MAX, f64::min);
        assert!(closest < 1e-6 * z.module().max(1.0), "z = {}, n = {}", z, n);
    }
}
