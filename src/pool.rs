use crate::letter::{ALPHABET, Letter, LetterIds, LetterOrigin};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Draws `amount` pool letters uniformly, with replacement, from every glyph of tier `1..=tier`.
pub fn generate_pool<R: Rng + ?Sized>(
    tier: u8,
    amount: usize,
    rng: &mut R,
    ids: &mut LetterIds,
) -> Vec<Letter> {
    let candidates: Vec<(char, u8)> = ALPHABET
        .iter()
        .copied()
        .filter(|(_, t)| (1..=tier).contains(t))
        .collect();

    let mut pool = Vec::with_capacity(amount);
    for _ in 0..amount {
        let Some(&(name, t)) = candidates.choose(rng) else {
            break;
        };
        pool.push(Letter::new(ids.next_id(), name, t, LetterOrigin::Pool));
    }
    pool
}

/// Replaces every unfrozen slot of `current` with a freshly drawn letter.
///
/// The result has `amount` slots. Frozen letters within the first `amount` slots keep
/// their index; frozen letters beyond it take over the first unfrozen slots, and are
/// appended only when every slot is already frozen. A refresh never drops a frozen letter.
pub fn refresh_pool<R: Rng + ?Sized>(
    current: &[Letter],
    tier: u8,
    amount: usize,
    rng: &mut R,
    ids: &mut LetterIds,
) -> Vec<Letter> {
    let mut overflow = current.iter().skip(amount).filter(|l| l.frozen).cloned();
    let mut pool: Vec<Letter> = generate_pool(tier, amount, rng, ids)
        .into_iter()
        .enumerate()
        .map(|(index, fresh)| match current.get(index) {
            Some(kept) if kept.frozen => kept.clone(),
            _ => overflow.next().unwrap_or(fresh),
        })
        .collect();
    pool.extend(overflow);
    pool
}
