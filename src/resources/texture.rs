//! Binary and texture fetching for native and web targets.

use crate::data_structures::texture;

pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window =
        web_sys::window().ok_or_else(|| anyhow::anyhow!("no window object available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("could not read location origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Fetches a binary asset, reporting best-effort fractional progress to the
/// log sink. On the web the fraction is only available when the server
/// sends a Content-Length; natively the file is read in chunks.
pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        let total = response.content_length();
        let data = response.bytes().await?.to_vec();
        report_progress(file_name, data.len() as u64, total);
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use std::io::Read;

        let path = std::path::Path::new("./").join("assets").join(file_name);
        let file = std::fs::File::open(&path)?;
        let total = file.metadata().ok().map(|m| m.len());
        let mut reader = std::io::BufReader::new(file);
        let mut data = Vec::new();
        let mut chunk = [0u8; 64 * 1024];
        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            report_progress(file_name, data.len() as u64, total);
        }
        data
    };

    Ok(data)
}

/// Observational only: logs a percentage when the total size is known,
/// otherwise just the byte count.
fn report_progress(file_name: &str, loaded: u64, total: Option<u64>) {
    match total {
        Some(total) if total > 0 => {
            log::info!(
                "loading {}: {:.0}%",
                file_name,
                loaded as f64 / total as f64 * 100.0
            );
        }
        _ => log::info!("loading {}: {} bytes", file_name, loaded),
    }
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: Option<&str>,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(file_name).await?;
    texture::Texture::from_bytes(device, queue, &data, file_name, format)
}
