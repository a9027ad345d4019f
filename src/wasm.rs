//! Browser bindings, built with the `wasm` feature.

use js_sys::Array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::board::Encoding;
use crate::config::GeneratorConfig;
use crate::generator::generate;

/// Generate `count` boards for a browser client.
///
/// Each board is returned as an array of rows in the [`Puzzle`](Encoding::Puzzle) encoding. Absent bounds are derived from the board area.
#[wasm_bindgen(js_name = generateBoards)]
pub fn generate_boards(width: u32, height: u32, count: u32, min: Option<u32>, max: Option<u32>, seed: u32) -> Result<Array, JsValue> {
    let config = GeneratorConfig {
        min_numbers: min.map(|min| min as usize),
        max_numbers: max.map(|max| max as usize),
        ..GeneratorConfig::new(width as usize, height as usize, count as usize)
    };
    let mut rng = StdRng::seed_from_u64(u64::from(seed));

    let boards = generate(&config, &mut rng).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(boards.iter()
        .map(|board| board.encode(Encoding::Puzzle).cells.iter()
            .map(|row| row.iter().map(|cell| JsValue::from(*cell as u32)).collect::<Array>())
            .collect::<Array>())
        .collect())
}
