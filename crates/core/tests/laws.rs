//! Property-based tests for the composition laws.
//!
//! - Associativity: `f ∘ (g ∘ h)` and `(f ∘ g) ∘ h` agree on every input,
//!   stop at the same stage, and render the same.
//! - Short-circuit: `and` / `or` skip their right operand exactly when the
//!   left one decides the result.
//! - Rendering never evaluates anything.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use netlang_core::{
    and, compose, function, mfunction, or, predicate, property, render, Combinator,
    MonadicFunction, Predicate,
};

fn counted_lookup(
    name: &str,
    modulus: u32,
    calls: Arc<AtomicUsize>,
) -> MonadicFunction<u32, Option<u32>> {
    mfunction(name, move |x: &u32| {
        calls.fetch_add(1, Ordering::SeqCst);
        if x % modulus == 0 {
            None
        } else {
            Some(x.wrapping_mul(3))
        }
    })
}

fn counted_predicate(name: &str, threshold: u32, calls: Arc<AtomicUsize>) -> Predicate<u32> {
    predicate(name, move |x: &u32| {
        calls.fetch_add(1, Ordering::SeqCst);
        *x >= threshold
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn kleisli_composition_associative(
        x in 0u32..10_000,
        offset in 0u32..100,
        mg in 2u32..7,
        mf in 2u32..7,
    ) {
        let h = property("h", move |x: &u32| x.wrapping_add(offset));

        let (g_left, f_left) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let left = compose(
            counted_lookup("f", mf, f_left.clone()),
            compose(counted_lookup("g", mg, g_left.clone()), h.clone()),
        );

        let (g_right, f_right) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let right = compose(
            compose(
                counted_lookup("f", mf, f_right.clone()),
                counted_lookup("g", mg, g_right.clone()),
            ),
            h,
        );

        prop_assert_eq!(left.apply(&x), right.apply(&x));
        prop_assert_eq!(g_left.load(Ordering::SeqCst), g_right.load(Ordering::SeqCst));
        prop_assert_eq!(f_left.load(Ordering::SeqCst), f_right.load(Ordering::SeqCst));
        prop_assert_eq!(render(&left), render(&right));
        prop_assert_eq!(render(&left), "f ∘ g ∘ h");
        prop_assert_eq!(left.signature(), right.signature());
    }

    #[test]
    fn mixed_composition_associative(x in 0u32..10_000, modulus in 2u32..5) {
        let lookup = mfunction("lookup", move |x: &u32| {
            if x % modulus == 0 { None } else { Some(*x) }
        });
        let double = function("double", |x: &u32| x.wrapping_mul(2));
        let text = function("text", |x: &u32| x.to_string());

        let left = compose(text.clone(), compose(double.clone(), lookup.clone()));
        let right = compose(compose(text, double), lookup);

        prop_assert_eq!(left.apply(&x), right.apply(&x));
        prop_assert_eq!(render(&left), render(&right));
    }

    #[test]
    fn bind_skips_later_stages(x in 0u32..10_000) {
        let calls = Arc::new(AtomicUsize::new(0));
        let first = mfunction("first", |x: &u32| if x % 2 == 0 { None } else { Some(*x) });
        let pipeline = compose(counted_lookup("second", 1_000_003, calls.clone()), first);

        let out = pipeline.apply(&x);
        if x % 2 == 0 {
            prop_assert_eq!(out, None);
            prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
        } else {
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn and_or_short_circuit(x in 0u32..200, left in 0u32..200, right in 0u32..200) {
        let (l_calls, r_calls) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let conj = and(
            counted_predicate("l", left, l_calls.clone()),
            counted_predicate("r", right, r_calls.clone()),
        );
        prop_assert_eq!(conj.apply(&x), x >= left && x >= right);
        let expected = if x >= left { 1 } else { 0 };
        prop_assert_eq!(r_calls.load(Ordering::SeqCst), expected);

        let (l_calls, r_calls) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let disj = or(
            counted_predicate("l", left, l_calls.clone()),
            counted_predicate("r", right, r_calls.clone()),
        );
        prop_assert_eq!(disj.apply(&x), x >= left || x >= right);
        let expected = if x >= left { 0 } else { 1 };
        prop_assert_eq!(r_calls.load(Ordering::SeqCst), expected);
        prop_assert_eq!(l_calls.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn render_does_not_evaluate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tree = and(
        counted_predicate("big", 10, calls.clone()),
        counted_predicate("huge", 100, calls.clone()),
    );

    let before = render(&tree);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tree.apply(&50);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(render(&tree), before);
}
