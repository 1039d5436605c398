use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use rand_mt::Mt64;

// Keys are laid out as:
// - 12 * 64 piece keys, indexed by (color, piece type, square)
// - 1 side to move key
// - 4 castling rights keys
// - 8 en passant file keys
const ZOBRIST_KEY_COUNT: usize = 12 * 64 + 1 + 4 + 8;
const ZOBRIST_SEED: u64 = 12345;

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let zobrist_file = Path::new(&out_dir).join("zobrist_keys.rs");
    let mut file = File::create(zobrist_file).unwrap();

    writeln!(&mut file, "impl ZobristHasher {{").unwrap();
    inject_array(
        &mut file,
        &format!("pub const ZOBRIST_KEYS: [u64; {}]", ZOBRIST_KEY_COUNT),
        &initialize_zobrist_keys(),
    );
    writeln!(&mut file, "}}").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}

fn inject_array<T: ToString>(file: &mut File, declaration: &str, array: &[T]) {
    writeln!(file, "{} = [", declaration).unwrap();
    for x in array {
        write!(file, "{}, ", x.to_string()).unwrap();
    }
    writeln!(file, "];").unwrap();
}

// A fixed seed keeps hashes reproducible from one build to the next
fn initialize_zobrist_keys() -> [u64; ZOBRIST_KEY_COUNT] {
    let mut rng = Mt64::new(ZOBRIST_SEED);
    [0u64; ZOBRIST_KEY_COUNT].map(|_| rng.next_u64())
}
