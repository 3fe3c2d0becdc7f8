// Code generated by cartridge-gen. DO NOT EDIT.
// API version 0.1.0

use wasmtime::{Caller, Engine, FuncType, Linker, Val, ValType};

use crate::api::support::{RetKind, load_stack, read_guest_string, store_results};
use crate::context::StoreData;

/// Record type `Color`, flattened to 4 stack lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn read_lanes(lanes: &[u64]) -> Self {
        Self {
            r: cartridge_abi::decode_f32(lanes[0]),
            g: cartridge_abi::decode_f32(lanes[1]),
            b: cartridge_abi::decode_f32(lanes[2]),
            a: cartridge_abi::decode_f32(lanes[3]),
        }
    }
}

fn config_set_flags(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let flags = cartridge_abi::decode_u32(lanes[0]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().config_set_flags(flags);
    Ok(())
}

fn config_flags(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().config_flags();
    store_results(&mut caller, results, &[cartridge_abi::encode_u32(ret0)], &[RetKind::I32]);
    Ok(())
}

fn platform_log(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let msg = read_guest_string(&mut caller, lanes[0], lanes[1]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().platform_log(&msg);
    Ok(())
}

fn platform_set_window_size(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let width = cartridge_abi::decode_i32(lanes[0]);
    let height = cartridge_abi::decode_i32(lanes[1]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().platform_set_window_size(width, height);
    Ok(())
}

fn platform_set_title(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let title = read_guest_string(&mut caller, lanes[0], lanes[1]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().platform_set_title(&title);
    Ok(())
}

fn platform_exit(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    ctx.lock().platform_exit();
    Ok(())
}

fn platform_fps(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().platform_fps();
    store_results(&mut caller, results, &[cartridge_abi::encode_f32(ret0)], &[RetKind::F32]);
    Ok(())
}

fn platform_tps(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().platform_tps();
    store_results(&mut caller, results, &[cartridge_abi::encode_f32(ret0)], &[RetKind::F32]);
    Ok(())
}

fn input_up(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let code = cartridge_abi::decode_i32(lanes[0]);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().input_up(code);
    store_results(&mut caller, results, &[cartridge_abi::encode_bool(ret0)], &[RetKind::I32]);
    Ok(())
}

fn input_down(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let code = cartridge_abi::decode_i32(lanes[0]);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().input_down(code);
    store_results(&mut caller, results, &[cartridge_abi::encode_bool(ret0)], &[RetKind::I32]);
    Ok(())
}

fn input_pressed(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let code = cartridge_abi::decode_i32(lanes[0]);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().input_pressed(code);
    store_results(&mut caller, results, &[cartridge_abi::encode_bool(ret0)], &[RetKind::I32]);
    Ok(())
}

fn input_cursor_x(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().input_cursor_x();
    store_results(&mut caller, results, &[cartridge_abi::encode_f32(ret0)], &[RetKind::F32]);
    Ok(())
}

fn input_cursor_y(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    load_stack(&mut caller, params);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().input_cursor_y();
    store_results(&mut caller, results, &[cartridge_abi::encode_f32(ret0)], &[RetKind::F32]);
    Ok(())
}

fn graphics_set_target_size(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let width = cartridge_abi::decode_i32(lanes[0]);
    let height = cartridge_abi::decode_i32(lanes[1]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_set_target_size(width, height);
    Ok(())
}

fn graphics_clear(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let color = Color::read_lanes(&lanes[0..4]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_clear(color);
    Ok(())
}

fn graphics_texture(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let handle = cartridge_abi::decode_u32(lanes[0]);
    let x = cartridge_abi::decode_f32(lanes[1]);
    let y = cartridge_abi::decode_f32(lanes[2]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_texture(handle, x, y);
    Ok(())
}

fn graphics_texture_ex(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let handle = cartridge_abi::decode_u32(lanes[0]);
    let x = cartridge_abi::decode_f32(lanes[1]);
    let y = cartridge_abi::decode_f32(lanes[2]);
    let rot = cartridge_abi::decode_f32(lanes[3]);
    let sx = cartridge_abi::decode_f32(lanes[4]);
    let sy = cartridge_abi::decode_f32(lanes[5]);
    let color = Color::read_lanes(&lanes[6..10]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_texture_ex(handle, x, y, rot, sx, sy, color);
    Ok(())
}

fn graphics_rectangle(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let x = cartridge_abi::decode_f32(lanes[0]);
    let y = cartridge_abi::decode_f32(lanes[1]);
    let w = cartridge_abi::decode_f32(lanes[2]);
    let h = cartridge_abi::decode_f32(lanes[3]);
    let color = Color::read_lanes(&lanes[4..8]);
    let line = cartridge_abi::decode_bool(lanes[8]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_rectangle(x, y, w, h, color, line);
    Ok(())
}

fn graphics_circle(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let x = cartridge_abi::decode_f32(lanes[0]);
    let y = cartridge_abi::decode_f32(lanes[1]);
    let rad = cartridge_abi::decode_f32(lanes[2]);
    let color = Color::read_lanes(&lanes[3..7]);
    let line = cartridge_abi::decode_bool(lanes[7]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_circle(x, y, rad, color, line);
    Ok(())
}

fn graphics_text(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    _results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let msg = read_guest_string(&mut caller, lanes[0], lanes[1]);
    let x = cartridge_abi::decode_f32(lanes[2]);
    let y = cartridge_abi::decode_f32(lanes[3]);
    let ctx = caller.data().ctx.clone();
    ctx.lock().graphics_text(&msg, x, y);
    Ok(())
}

fn asset_load_image(
    mut caller: Caller<'_, StoreData>,
    params: &[Val],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    let lanes = load_stack(&mut caller, params);
    let path = read_guest_string(&mut caller, lanes[0], lanes[1]);
    let ctx = caller.data().ctx.clone();
    let ret0 = ctx.lock().asset_load_image(&path);
    store_results(&mut caller, results, &[cartridge_abi::encode_u32(ret0)], &[RetKind::I32]);
    Ok(())
}

/// Install every host API function on the linker under the `env` module.
pub fn register(engine: &Engine, linker: &mut Linker<StoreData>) -> wasmtime::Result<()> {
    linker.func_new(
        "env",
        "ConfigSetFlags",
        FuncType::new(
            engine,
            [
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        config_set_flags,
    )?;
    linker.func_new(
        "env",
        "ConfigFlags",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [
                ValType::I32,
            ],
        ),
        config_flags,
    )?;
    linker.func_new(
        "env",
        "PlatformLog",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        platform_log,
    )?;
    linker.func_new(
        "env",
        "PlatformSetWindowSize",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        platform_set_window_size,
    )?;
    linker.func_new(
        "env",
        "PlatformSetTitle",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        platform_set_title,
    )?;
    linker.func_new(
        "env",
        "PlatformExit",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [ValType::I32; 0],
        ),
        platform_exit,
    )?;
    linker.func_new(
        "env",
        "PlatformFps",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [
                ValType::F32,
            ],
        ),
        platform_fps,
    )?;
    linker.func_new(
        "env",
        "PlatformTps",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [
                ValType::F32,
            ],
        ),
        platform_tps,
    )?;
    linker.func_new(
        "env",
        "InputUp",
        FuncType::new(
            engine,
            [
                ValType::I32,
            ],
            [
                ValType::I32,
            ],
        ),
        input_up,
    )?;
    linker.func_new(
        "env",
        "InputDown",
        FuncType::new(
            engine,
            [
                ValType::I32,
            ],
            [
                ValType::I32,
            ],
        ),
        input_down,
    )?;
    linker.func_new(
        "env",
        "InputPressed",
        FuncType::new(
            engine,
            [
                ValType::I32,
            ],
            [
                ValType::I32,
            ],
        ),
        input_pressed,
    )?;
    linker.func_new(
        "env",
        "InputCursorX",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [
                ValType::F32,
            ],
        ),
        input_cursor_x,
    )?;
    linker.func_new(
        "env",
        "InputCursorY",
        FuncType::new(
            engine,
            [ValType::I32; 0],
            [
                ValType::F32,
            ],
        ),
        input_cursor_y,
    )?;
    linker.func_new(
        "env",
        "GraphicsSetTargetSize",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        graphics_set_target_size,
    )?;
    linker.func_new(
        "env",
        "GraphicsClear",
        FuncType::new(
            engine,
            [
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
            ],
            [ValType::I32; 0],
        ),
        graphics_clear,
    )?;
    linker.func_new(
        "env",
        "GraphicsTexture",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::F32,
                ValType::F32,
            ],
            [ValType::I32; 0],
        ),
        graphics_texture,
    )?;
    linker.func_new(
        "env",
        "GraphicsTextureEx",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
            ],
            [ValType::I32; 0],
        ),
        graphics_texture_ex,
    )?;
    linker.func_new(
        "env",
        "GraphicsRectangle",
        FuncType::new(
            engine,
            [
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        graphics_rectangle,
    )?;
    linker.func_new(
        "env",
        "GraphicsCircle",
        FuncType::new(
            engine,
            [
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::F32,
                ValType::I32,
            ],
            [ValType::I32; 0],
        ),
        graphics_circle,
    )?;
    linker.func_new(
        "env",
        "GraphicsText",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
                ValType::F32,
                ValType::F32,
            ],
            [ValType::I32; 0],
        ),
        graphics_text,
    )?;
    linker.func_new(
        "env",
        "AssetLoadImage",
        FuncType::new(
            engine,
            [
                ValType::I32,
                ValType::I32,
            ],
            [
                ValType::I32,
            ],
        ),
        asset_load_image,
    )?;
    Ok(())
}
