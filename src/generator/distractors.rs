use rand::Rng;

/// Random draws allowed before switching to the outward scan.
pub const MAX_RANDOM_DRAWS: usize = 64;

const MAX_OFFSET: i64 = 5;

/// Pick `count` distinct wrong answers near `answer`.
///
/// Candidates are `answer + offset` with offset in [-5, 5] (a zero offset
/// becomes +1), keeping only positive values that differ from `answer`.
/// Once `MAX_RANDOM_DRAWS` draws are spent, the remaining slots are filled
/// by scanning outward: answer+1, answer-1, answer+2, ...
pub fn pick_distractors<R: Rng + ?Sized>(answer: u32, count: usize, rng: &mut R) -> Vec<u32> {
    let mut picked: Vec<u32> = Vec::with_capacity(count);
    let base = answer as i64;

    let mut draws = 0;
    while picked.len() < count && draws < MAX_RANDOM_DRAWS {
        draws += 1;
        let offset = match rng.gen_range(-MAX_OFFSET..=MAX_OFFSET) {
            0 => 1,
            o => o,
        };
        push_candidate(&mut picked, base + offset, answer);
    }

    let mut step = 1;
    while picked.len() < count {
        push_candidate(&mut picked, base + step, answer);
        if picked.len() < count {
            push_candidate(&mut picked, base - step, answer);
        }
        step += 1;
    }

    picked
}

fn push_candidate(picked: &mut Vec<u32>, candidate: i64, answer: u32) {
    if candidate <= 0 || candidate > u32::MAX as i64 {
        return;
    }
    let candidate = candidate as u32;
    if candidate != answer && !picked.contains(&candidate) {
        picked.push(candidate);
    }
}
