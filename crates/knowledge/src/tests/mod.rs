mod deflection;
