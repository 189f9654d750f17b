use image::GenericImageView;
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Panel size in the native (portrait) orientation
const SPLASH_WIDTH: u32 = 240;
const SPLASH_HEIGHT: u32 = 320;

/// Pack 8-bit RGB into RGB565
fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

/// Convert PNG image to big-endian RGB565 at build time
fn convert_image_to_rgb565(
    input_path: &str,
    output_path: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", input_path);

    // Check if input file exists
    if !Path::new(input_path).exists() {
        println!(
            "cargo:warning=Image file '{}' not found, skipping conversion",
            input_path
        );
        // Create empty file so build doesn't fail
        File::create(output_path)?;
        return Ok(());
    }

    let img = image::open(input_path)?;
    let (orig_width, orig_height) = img.dimensions();
    println!(
        "cargo:warning=Converting image: {} ({}x{})",
        input_path, orig_width, orig_height
    );

    // Calculate aspect-ratio-preserving dimensions
    let orig_ratio = orig_width as f32 / orig_height as f32;
    let target_ratio = target_width as f32 / target_height as f32;
    let (new_width, new_height) = if orig_ratio > target_ratio {
        (target_width, (target_width as f32 / orig_ratio) as u32)
    } else {
        ((target_height as f32 * orig_ratio) as u32, target_height)
    };

    let rgb = img
        .resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
        .to_rgb8();

    // Centre on a black background
    let offset_x = (target_width - rgb.width()) / 2;
    let offset_y = (target_height - rgb.height()) / 2;

    let mut buffer = Vec::with_capacity((target_width * target_height * 2) as usize);
    for y in 0..target_height {
        for x in 0..target_width {
            let pixel = x
                .checked_sub(offset_x)
                .zip(y.checked_sub(offset_y))
                .filter(|&(ix, iy)| ix < rgb.width() && iy < rgb.height())
                .map(|(ix, iy)| rgb.get_pixel(ix, iy).0)
                .unwrap_or([0, 0, 0]);
            // Wire order: most significant byte first
            buffer.extend_from_slice(&rgb565(pixel[0], pixel[1], pixel[2]).to_be_bytes());
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(&buffer)?;

    println!(
        "cargo:warning=Splash image saved to: {} ({} bytes)",
        output_path.display(),
        buffer.len()
    );
    Ok(())
}

fn main() {
    // Only the firmware build links against ESP-IDF
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    let Some(out_dir) = env::var_os("OUT_DIR") else {
        println!("cargo:warning=OUT_DIR not set, skipping splash conversion");
        return;
    };
    let splash_output = Path::new(&out_dir).join("splash.bin");

    if let Err(e) =
        convert_image_to_rgb565("splash.png", &splash_output, SPLASH_WIDTH, SPLASH_HEIGHT)
    {
        println!("cargo:warning=Failed to convert splash.png: {}", e);
        // Keep include_bytes! working
        if let Err(e) = File::create(&splash_output) {
            println!("cargo:warning=Could not create {}: {}", splash_output.display(), e);
        }
    }

    println!("cargo:rerun-if-changed=splash.png");
}
