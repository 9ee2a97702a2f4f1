use rand::Rng;

const TOKEN_LEN: usize = 10;
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Builds an address at `domain` that almost certainly has no mailbox, e.g.
/// `k3v9q0x2ab-nope-4821@example.com`. Every call draws fresh randomness.
pub fn impostor_address(domain: &str) -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
        .collect();
    let suffix: u16 = rng.gen_range(1000..=9999);
    format!("{token}-nope-{suffix}@{domain}")
}
