//! Save-format scripts used across the integration tests.

/// Text saves made of `key=value` lines; `strArgs[1]` names the key.
pub const KEY_VALUE: &str = r#"
local values = {}
local order = {}

for line in edizon.getSaveFileString():gmatch("[^\r\n]+") do
  local key, value = line:match("^([%w_]+)=(-?%d+)$")
  if key then
    if values[key] == nil then
      order[#order + 1] = key
    end
    values[key] = tonumber(value)
  end
end

function getValueFromSaveFile()
  return values[edizon.getStrArgs()[1]]
end

function setValueInSaveFile(value)
  local key = edizon.getStrArgs()[1]
  if values[key] == nil then
    order[#order + 1] = key
  end
  values[key] = value
end

function getModifiedSaveFile()
  local lines = {}
  for _, key in ipairs(order) do
    lines[#lines + 1] = key .. "=" .. tostring(values[key])
  end
  return table.concat(lines, "\n") .. "\n"
end
"#;

/// Binary saves; `intArgs[1]` is the 0-based offset of a single byte.
pub const BYTE_OFFSET: &str = r#"
local buffer = edizon.getSaveFileBuffer()

function getValueFromSaveFile()
  return buffer[edizon.getIntArgs()[1] + 1]
end

function setValueInSaveFile(value)
  buffer[edizon.getIntArgs()[1] + 1] = value
end

function getModifiedSaveFile()
  return buffer
end
"#;

/// Echoes its arguments back so tests can observe what the host passed.
pub const ARGS_ECHO: &str = r#"
function getValueFromSaveFile()
  local s = edizon.getStrArgs()
  local i = edizon.getIntArgs()
  print("args", #s, #i)
  return table.concat(s, ",") .. "|" .. table.concat(i, ",")
end

function setValueInSaveFile(value)
end

function getModifiedSaveFile()
  return ""
end
"#;

/// Loads fine but defines no entry points.
pub const NO_ENTRY_POINTS: &str = r#"
print("loaded without entry points")
"#;

pub const SYNTAX_ERROR: &str = "function getValueFromSaveFile(\n";

pub const LOAD_TIME_ERROR: &str = r#"error("cannot decode save")"#;

/// Tries to reach the filesystem from inside the sandbox.
pub const ESCAPES_SANDBOX: &str = r#"
local f = io.open("/etc/passwd")
"#;

/// Tries to read item arguments while loading.
pub const ARGS_AT_LOAD: &str = r#"
local s = edizon.getStrArgs()
"#;
